// Support tickets: status and assignment are admin edits, messages are
// append-only.

use chrono::Utc;
use tracing::info;

use super::Sportsbook;
use crate::error::StoreError;
use crate::ids::generate_id;
use crate::models::{MessageSender, SupportTicket, TicketMessage, TicketStatus};

impl Sportsbook {
    fn ticket_mut(&mut self, ticket_id: &str) -> Result<&mut SupportTicket, StoreError> {
        self.tickets
            .iter_mut()
            .find(|t| t.id == ticket_id)
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))
    }

    pub fn find_ticket(&self, ticket_id: &str) -> Option<&SupportTicket> {
        self.tickets.iter().find(|t| t.id == ticket_id)
    }

    pub fn update_ticket_status(
        &mut self,
        ticket_id: &str,
        status: TicketStatus,
    ) -> Result<(), StoreError> {
        self.ticket_mut(ticket_id)?.status = status;
        self.commit();
        info!(ticket = ticket_id, ?status, "🎫 Ticket status changed");
        Ok(())
    }

    pub fn assign_ticket(&mut self, ticket_id: &str, agent: &str) -> Result<(), StoreError> {
        self.ticket_mut(ticket_id)?.assigned_to = Some(agent.to_string());
        self.commit();
        info!(ticket = ticket_id, agent, "🎫 Ticket assigned");
        Ok(())
    }

    pub fn add_ticket_message(
        &mut self,
        ticket_id: &str,
        message: &str,
        sender: MessageSender,
    ) -> Result<TicketMessage, StoreError> {
        let entry = TicketMessage {
            id: generate_id(),
            sender,
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        self.ticket_mut(ticket_id)?.messages.push(entry.clone());
        self.commit();
        Ok(entry)
    }
}
