//! Fan-out engine
//!
//! A message event goes first to the conversation's broadcast group, then
//! directly to every live connection of every participant that was not in
//! the group snapshot. Each live participant connection receives it exactly
//! once.

use crate::connection::{Connection, ConnectionManager};
use crate::protocol::GatewayMessage;
use chat_common::FanoutStrategy;
use chat_core::{ConversationId, UserId};
use chat_service::{ConversationService, ServiceContext};
use std::collections::HashSet;
use std::sync::Arc;

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections reached through the broadcast group
    pub via_group: usize,
    /// Connections reached by direct fallback
    pub direct: usize,
    /// Connections whose outbound queue rejected the event
    pub failed: usize,
}

impl DeliveryReport {
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.via_group + self.direct
    }
}

/// Fan-out engine
pub struct FanoutEngine {
    connections: Arc<ConnectionManager>,
    strategy: FanoutStrategy,
}

impl FanoutEngine {
    /// Create a new fan-out engine
    pub fn new(connections: Arc<ConnectionManager>, strategy: FanoutStrategy) -> Self {
        Self {
            connections,
            strategy,
        }
    }

    pub fn strategy(&self) -> FanoutStrategy {
        self.strategy
    }

    /// Deliver a persisted message event to the whole conversation
    ///
    /// Participants are resolved after the group delivery. If that lookup
    /// fails, only the group has been reached; the failure is logged.
    pub async fn fan_out(
        &self,
        services: &ServiceContext,
        conversation_id: &ConversationId,
        event: &GatewayMessage,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let group = self.deliver_to_group(conversation_id, event, &mut report);

        match ConversationService::new(services)
            .participant_ids(conversation_id)
            .await
        {
            Ok(participants) => self.deliver_direct(&participants, &group, event, &mut report),
            Err(e) => tracing::warn!(
                conversation_id = %conversation_id,
                error = %e,
                "Participant lookup failed, direct delivery skipped"
            ),
        }

        tracing::debug!(
            conversation_id = %conversation_id,
            via_group = report.via_group,
            direct = report.direct,
            failed = report.failed,
            "Fan-out complete"
        );

        report
    }

    /// Deliver to the group and then to the given participants
    pub fn deliver(
        &self,
        conversation_id: &ConversationId,
        participants: &[UserId],
        event: &GatewayMessage,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let group = self.deliver_to_group(conversation_id, event, &mut report);
        self.deliver_direct(participants, &group, event, &mut report);
        report
    }

    /// Send to the current group snapshot and return the snapshot's connection IDs
    fn deliver_to_group(
        &self,
        conversation_id: &ConversationId,
        event: &GatewayMessage,
        report: &mut DeliveryReport,
    ) -> HashSet<String> {
        let snapshot = self.connections.get_group_connections(conversation_id);
        let mut reached = HashSet::with_capacity(snapshot.len());

        for conn in snapshot {
            if Self::send(&conn, event) {
                report.via_group += 1;
            } else {
                report.failed += 1;
            }
            reached.insert(conn.id().to_string());
        }

        reached
    }

    fn deliver_direct(
        &self,
        participants: &[UserId],
        group: &HashSet<String>,
        event: &GatewayMessage,
        report: &mut DeliveryReport,
    ) {
        let mut seen: HashSet<&UserId> = HashSet::with_capacity(participants.len());

        for user_id in participants {
            if !seen.insert(user_id) {
                continue;
            }

            for conn in self.connections.connections_of(user_id, self.strategy) {
                if group.contains(conn.id()) {
                    continue;
                }
                if Self::send(&conn, event) {
                    report.direct += 1;
                } else {
                    report.failed += 1;
                }
            }
        }
    }

    fn send(conn: &Connection, event: &GatewayMessage) -> bool {
        match conn.send(event.clone()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    connection_id = %conn.id(),
                    user_id = %conn.user_id(),
                    error = %e,
                    "Message delivery failed"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for FanoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEngine")
            .field("strategy", &self.strategy)
            .finish()
    }
}
