//! Handlers for orders received from the server.

use remoteapp_core::{
    AbortStatus, ChannelResult, RailEvent,
    orders::{ExecResultOrder, HandshakeExOrder, HandshakeOrder},
};

use crate::{RailClientContext, RailServerEvents, complete_handshake};

/// Reason given when the server could not launch the program.
pub const EXEC_FAILED_REASON: &str = "Failed to execute RAIL command.";

/// Server event handlers driving a RemoteApp launch.
///
/// Either handshake variant runs the full startup sequence; the server is
/// only expected to send one of them, but both are handled the same way.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteAppHandlers;

impl RemoteAppHandlers {
    fn on_handshake(rail: &RailClientContext, extended: bool) -> ChannelResult {
        if let Some(session) = rail.session() {
            session
                .events()
                .push(RailEvent::HandshakeReceived { extended });
        }
        complete_handshake(rail)
    }
}

impl RailServerEvents for RemoteAppHandlers {
    fn handshake(&self, rail: &RailClientContext, _order: &HandshakeOrder) -> ChannelResult {
        Self::on_handshake(rail, false)
    }

    fn handshake_ex(&self, rail: &RailClientContext, _order: &HandshakeExOrder) -> ChannelResult {
        Self::on_handshake(rail, true)
    }

    /// A failed launch ends the session, not the channel, so this always
    /// reports OK to the transport.
    fn execute_result(&self, rail: &RailClientContext, order: &ExecResultOrder) -> ChannelResult {
        let Some(session) = rail.session() else {
            tracing::debug!(
                code = order.exec_result,
                "RAIL execute result received without an owning session"
            );
            return Ok(());
        };

        session.events().push(RailEvent::ExecuteResult {
            code: order.exec_result,
            raw_result: order.raw_result,
        });

        let result = order.result();
        if !result.is_success() {
            tracing::debug!(
                code = order.exec_result,
                raw_result = order.raw_result,
                "Failed to execute RAIL command on server: {}",
                result.description()
            );
            session.abort(AbortStatus::UpstreamUnavailable, EXEC_FAILED_REASON);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex, Weak};

    use remoteapp_core::{
        ChannelError, MessageGate, RailClient, RailEventStore, RailSession, RemoteAppSettings,
        loopback::{LoopbackClient, OrderKind},
    };

    use super::*;
    use crate::RailState;

    struct TestSession {
        settings: RemoteAppSettings,
        gate: MessageGate,
        events: RailEventStore,
        aborts: Mutex<Vec<(AbortStatus, String)>>,
    }

    impl RailSession for TestSession {
        fn settings(&self) -> &RemoteAppSettings {
            &self.settings
        }

        fn message_gate(&self) -> &MessageGate {
            &self.gate
        }

        fn abort(&self, status: AbortStatus, reason: &str) {
            self.aborts.lock().unwrap().push((status, reason.to_string()));
        }

        fn events(&self) -> &RailEventStore {
            &self.events
        }
    }

    fn setup() -> (Arc<TestSession>, Arc<LoopbackClient>, RailClientContext) {
        let session = Arc::new(TestSession {
            settings: RemoteAppSettings::new(800, 600, "||notepad"),
            gate: MessageGate::new(),
            events: RailEventStore::new(),
            aborts: Mutex::new(Vec::new()),
        });
        let client = Arc::new(LoopbackClient::new());
        let rail = RailClientContext::new(Arc::clone(&client) as Arc<dyn RailClient>);
        let weak: Weak<dyn RailSession> = Arc::downgrade(&session) as Weak<TestSession>;
        rail.register(weak, Arc::new(RemoteAppHandlers));
        (session, client, rail)
    }

    fn exec_result(code: u16) -> ExecResultOrder {
        ExecResultOrder {
            exec_result: code,
            raw_result: 0x8000_4005,
            exe_or_file: "notepad".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_orders_before_handshake() {
        let (_session, client, rail) = setup();
        assert_eq!(rail.server_execute_result(&exec_result(0)), Ok(()));
        assert!(client.sent().is_empty());
        assert_eq!(rail.state(), RailState::AwaitingHandshake);

        rail.server_handshake(&HandshakeOrder { build_number: 1 }).unwrap();
        assert_eq!(rail.state(), RailState::HandshakeComplete);
        rail.server_execute_result(&exec_result(0)).unwrap();
        assert_eq!(rail.state(), RailState::ExecutionReported);
    }

    #[test]
    fn test_either_handshake_variant_runs_sequence() {
        let (session, client, rail) = setup();

        rail.server_handshake_ex(&HandshakeExOrder {
            build_number: 0x4563,
            rail_handshake_flags: 0,
        })
        .unwrap();
        assert_eq!(client.sent().len(), 4);

        rail.server_handshake(&HandshakeOrder {
            build_number: 0x4563,
        })
        .unwrap();
        assert_eq!(client.sent().len(), 8);
        assert_eq!(rail.state(), RailState::HandshakeComplete);

        assert_eq!(
            session.events.get_history(),
            vec![
                RailEvent::HandshakeReceived { extended: true },
                RailEvent::HandshakeCompleted,
                RailEvent::HandshakeReceived { extended: false },
                RailEvent::HandshakeCompleted,
            ]
        );
    }

    #[test]
    fn test_handshake_failure_returned_to_transport() {
        let (session, client, rail) = setup();
        client.fail_on(OrderKind::SysParam, 0x10);

        assert_eq!(
            rail.server_handshake(&HandshakeOrder { build_number: 1 }),
            Err(ChannelError::new(0x10))
        );
        assert!(session.aborts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_success_result_does_not_abort() {
        let (session, _client, rail) = setup();
        rail.server_handshake(&HandshakeOrder { build_number: 1 }).unwrap();
        assert_eq!(rail.server_execute_result(&exec_result(0)), Ok(()));
        assert!(session.aborts.lock().unwrap().is_empty());
        assert_eq!(rail.state(), RailState::ExecutionReported);
    }

    #[test]
    fn test_failure_result_aborts_and_returns_ok() {
        for code in [1, 3, 5, 6, 7, 42] {
            let (session, _client, rail) = setup();
            assert_eq!(rail.server_execute_result(&exec_result(code)), Ok(()));
            assert_eq!(
                *session.aborts.lock().unwrap(),
                vec![(AbortStatus::UpstreamUnavailable, EXEC_FAILED_REASON.to_string())],
                "result code {code}"
            );
            assert_eq!(
                session.events.get_history(),
                vec![RailEvent::ExecuteResult {
                    code,
                    raw_result: 0x8000_4005
                }]
            );
        }
    }

    #[test]
    fn test_result_after_session_dropped() {
        let (session, _client, rail) = setup();
        drop(session);
        assert_eq!(rail.server_execute_result(&exec_result(6)), Ok(()));
    }
}
