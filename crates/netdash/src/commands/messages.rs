//! Message command handlers.

use std::str::FromStr;
use std::sync::Arc;

use tabled::Tabled;

use netdash_core::{EntityId, Message, MessageDraft, MessagePriority, MessagesHook};

use crate::cli::{GlobalOpts, MessagesArgs, MessagesCommand, SendArgs};
use crate::error::CliError;
use crate::output;

use super::documents::print_page_footer;
use super::util;

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "")]
    unread: &'static str,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "From")]
    sender: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Received")]
    received: String,
}

impl From<&Arc<Message>> for MessageRow {
    fn from(m: &Arc<Message>) -> Self {
        Self {
            id: m.id.to_string(),
            unread: if m.read { "" } else { "●" },
            subject: m.subject.clone(),
            sender: m.sender.clone(),
            priority: m.priority.to_string(),
            received: m.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn detail(m: &Arc<Message>) -> String {
    [
        format!("ID:       {}", m.id),
        format!("From:     {}", m.sender),
        format!("To:       {}", m.recipients.join(", ")),
        format!("Subject:  {}", m.subject),
        format!("Priority: {}", m.priority),
        format!("Read:     {}", if m.read { "yes" } else { "no" }),
        format!("Received: {}", m.created_at.to_rfc3339()),
        String::new(),
        m.body.clone(),
    ]
    .join("\n")
}

fn id_of(m: &Arc<Message>) -> String {
    m.id.to_string()
}

fn render_message(global: &GlobalOpts, message: &Arc<Message>) -> Result<(), CliError> {
    let out = output::render_single(global.output, message, detail, id_of)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn draft_from(args: SendArgs) -> Result<MessageDraft, CliError> {
    let priority =
        MessagePriority::from_str(args.priority.trim()).map_err(|_| CliError::Validation {
            field: "priority".into(),
            reason: format!(
                "expected low, normal, high or urgent, got '{}'",
                args.priority
            ),
        })?;
    Ok(MessageDraft {
        subject: args.subject,
        body: args.body,
        recipients: args.recipients,
        priority,
    })
}

pub async fn handle(
    hook: &MessagesHook,
    args: MessagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MessagesCommand::List { list, unread } => {
            let page = hook.list(util::list_params(&list)).await?;
            let items = if unread {
                hook.filtered(|m| !m.read)
            } else {
                hook.state().items.clone()
            };
            let out = output::render_list(global.output, &items, |m| MessageRow::from(m), id_of)?;
            output::print_output(&out, global.quiet);
            print_page_footer(global, &page);
            Ok(())
        }

        MessagesCommand::Get { id } => {
            let entity: EntityId = id.as_str().into();
            let message = hook
                .get(&entity)
                .await
                .map_err(|e| CliError::from_core(e, "message", &id))?;
            render_message(global, &message)
        }

        MessagesCommand::Read { id } => {
            let entity: EntityId = id.as_str().into();
            let message = hook
                .mark_read(&entity)
                .await
                .map_err(|e| CliError::from_core(e, "message", &id))?;
            render_message(global, &message)
        }

        MessagesCommand::Send(send) => {
            let draft = draft_from(send)?;
            let message = hook.slice().create(draft, None, None).await?;
            render_message(global, &message)
        }

        MessagesCommand::Delete { id } => {
            let approved = util::confirm(&format!("Delete message {id}?"), global.yes)?;
            let entity: EntityId = id.as_str().into();
            hook.delete_with_confirmation(&entity, Some(move |_: &EntityId| approved))
                .await
                .map_err(|e| CliError::from_core(e, "message", &id))?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn send(priority: &str) -> SendArgs {
        SendArgs {
            subject: "Maintenance".into(),
            body: "Core switch reboot at 02:00".into(),
            recipients: vec!["noc@example.net".into()],
            priority: priority.into(),
        }
    }

    #[test]
    fn priority_is_trimmed() {
        assert_eq!(draft_from(send(" high ")).unwrap().priority, MessagePriority::High);
    }

    #[test]
    fn unknown_priority_is_a_usage_error() {
        let err = draft_from(send("critical")).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "priority"));
    }
}
