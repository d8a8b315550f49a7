//! Client side of the RAIL startup sequence.
//!
//! After the server's Handshake or HandshakeEx PDU, the client must send,
//! in order: Handshake, Client Information, Client System Parameters Update
//! and Client Execute. None of them may be sent earlier.

use remoteapp_core::{
    CLIENT_BUILD_NUMBER, ChannelError, ChannelResult, RailClient, RailEvent, RailSession,
    RemoteAppSettings,
    orders::{
        ClientStatusOrder, ExecOrder, HandshakeOrder, HighContrast, Rectangle16, SysParamOrder,
        exec_flags, hcf, spi_mask,
    },
    status::rc,
};

use crate::RailClientContext;

/// Client Handshake PDU.
#[must_use]
pub const fn handshake_order() -> HandshakeOrder {
    HandshakeOrder {
        build_number: CLIENT_BUILD_NUMBER,
    }
}

/// Client Information PDU with no optional capabilities.
#[must_use]
pub const fn client_status_order() -> ClientStatusOrder {
    ClientStatusOrder { flags: 0 }
}

/// Client System Parameters Update PDU describing a plain desktop of the
/// configured size.
#[must_use]
pub fn sys_param_order(settings: &RemoteAppSettings) -> SysParamOrder {
    SysParamOrder {
        params: spi_mask::SET_DRAG_FULL_WINDOWS
            | spi_mask::SET_HIGH_CONTRAST
            | spi_mask::SET_KEYBOARD_CUES
            | spi_mask::SET_KEYBOARD_PREF
            | spi_mask::SET_MOUSE_BUTTON_SWAP
            | spi_mask::SET_WORK_AREA,
        drag_full_windows: false,
        high_contrast: HighContrast {
            flags: hcf::AVAILABLE
                | hcf::CONFIRM_HOTKEY
                | hcf::HOTKEY_ACTIVE
                | hcf::HOTKEY_AVAILABLE
                | hcf::HOTKEY_SOUND
                | hcf::INDICATOR,
            color_scheme: None,
        },
        keyboard_cues: false,
        keyboard_pref: false,
        mouse_button_swap: false,
        work_area: Rectangle16 {
            left: 0,
            top: 0,
            right: settings.width,
            bottom: settings.height,
        },
    }
}

/// Client Execute PDU launching the configured program.
#[must_use]
pub fn exec_order(settings: &RemoteAppSettings) -> ExecOrder {
    ExecOrder {
        flags: exec_flags::EXPAND_ARGUMENTS,
        program: settings.program.clone(),
        working_dir: settings.working_dir.clone(),
        arguments: settings.arguments.clone(),
    }
}

/// Send the four startup orders through the session's message gate.
///
/// Stops at the first order the transport rejects and returns its status.
/// Safe to run again for a second handshake: every order is a plain command.
///
/// # Errors
/// Returns the transport error of the first failing send, or
/// `NOT_INITIALIZED` if the owning session is gone.
pub fn complete_handshake(rail: &RailClientContext) -> ChannelResult {
    let Some(session) = rail.session() else {
        tracing::debug!("RAIL handshake received without an owning session");
        return Err(ChannelError::new(rc::NOT_INITIALIZED));
    };

    let result = send_startup_orders(rail.client(), session.as_ref());
    match result {
        Ok(()) => session.events().push(RailEvent::HandshakeCompleted),
        Err(e) => {
            tracing::debug!(code = e.code(), "RAIL startup sequence failed");
            session
                .events()
                .push(RailEvent::HandshakeFailed { code: e.code() });
        }
    }
    result
}

fn send_startup_orders(client: &dyn RailClient, session: &dyn RailSession) -> ChannelResult {
    let gate = session.message_gate();
    let settings = session.settings();

    let handshake = handshake_order();
    gate.send(|| client.client_handshake(&handshake))?;

    let client_status = client_status_order();
    gate.send(|| client.client_information(&client_status))?;

    let sysparam = sys_param_order(settings);
    gate.send(|| client.client_system_param(&sysparam))?;

    let exec = exec_order(settings);
    gate.send(|| client.client_execute(&exec))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use remoteapp_core::{
        AbortStatus, MessageGate, RailEventStore,
        loopback::{LoopbackClient, OrderKind, SentOrder},
    };

    use super::*;
    use crate::handlers::RemoteAppHandlers;

    struct TestSession {
        settings: RemoteAppSettings,
        gate: MessageGate,
        events: RailEventStore,
    }

    impl RailSession for TestSession {
        fn settings(&self) -> &RemoteAppSettings {
            &self.settings
        }

        fn message_gate(&self) -> &MessageGate {
            &self.gate
        }

        fn abort(&self, _: AbortStatus, _: &str) {}

        fn events(&self) -> &RailEventStore {
            &self.events
        }
    }

    fn setup() -> (Arc<TestSession>, Arc<LoopbackClient>, RailClientContext) {
        let session = Arc::new(TestSession {
            settings: RemoteAppSettings::new(1280, 720, "||wordpad")
                .with_working_dir("C:\\Temp")
                .with_arguments("%USERPROFILE%\\notes.rtf"),
            gate: MessageGate::new(),
            events: RailEventStore::new(),
        });
        let client = Arc::new(LoopbackClient::new());
        let rail = RailClientContext::new(Arc::clone(&client) as Arc<dyn RailClient>);
        let weak: Weak<dyn RailSession> = Arc::downgrade(&session) as Weak<TestSession>;
        rail.register(weak, Arc::new(RemoteAppHandlers));
        (session, client, rail)
    }

    #[test]
    fn test_sends_orders_in_fixed_order() {
        let (session, client, rail) = setup();

        assert_eq!(complete_handshake(&rail), Ok(()));
        assert_eq!(
            client.sent_kinds(),
            vec![
                OrderKind::Handshake,
                OrderKind::ClientStatus,
                OrderKind::SysParam,
                OrderKind::Execute,
            ]
        );
        assert_eq!(session.events.get_history(), vec![RailEvent::HandshakeCompleted]);
    }

    #[test]
    fn test_order_contents() {
        let (_session, client, rail) = setup();
        complete_handshake(&rail).unwrap();

        let sent = client.sent();
        assert_eq!(sent[0], SentOrder::Handshake(HandshakeOrder { build_number: 7600 }));
        assert_eq!(sent[1], SentOrder::ClientStatus(ClientStatusOrder { flags: 0 }));

        let SentOrder::SysParam(sysparam) = &sent[2] else {
            panic!("expected system parameters, got {:?}", sent[2]);
        };
        assert_eq!(sysparam.params, 0x3f);
        assert_eq!(sysparam.high_contrast.flags, 0x7e);
        assert_eq!(sysparam.high_contrast.color_scheme, None);
        assert!(!sysparam.drag_full_windows);
        assert!(!sysparam.keyboard_cues);
        assert!(!sysparam.keyboard_pref);
        assert!(!sysparam.mouse_button_swap);
        assert_eq!(
            sysparam.work_area,
            Rectangle16 {
                left: 0,
                top: 0,
                right: 1280,
                bottom: 720
            }
        );

        let SentOrder::Execute(exec) = &sent[3] else {
            panic!("expected execute, got {:?}", sent[3]);
        };
        assert_eq!(exec.flags, exec_flags::EXPAND_ARGUMENTS);
        assert_eq!(exec.program, "||wordpad");
        assert_eq!(exec.working_dir.as_deref(), Some("C:\\Temp"));
        assert_eq!(exec.arguments.as_deref(), Some("%USERPROFILE%\\notes.rtf"));
    }

    #[test]
    fn test_halts_at_first_failure() {
        for (failing, expected_sent) in [
            (OrderKind::Handshake, 0),
            (OrderKind::ClientStatus, 1),
            (OrderKind::SysParam, 2),
            (OrderKind::Execute, 3),
        ] {
            let (session, client, rail) = setup();
            client.fail_on(failing, 0x0b);

            assert_eq!(complete_handshake(&rail), Err(ChannelError::new(0x0b)));
            assert_eq!(client.sent().len(), expected_sent, "failing at {failing:?}");
            assert_eq!(
                session.events.get_history(),
                vec![RailEvent::HandshakeFailed { code: 0x0b }]
            );
        }
    }

    #[test]
    fn test_rerun_sends_full_sequence_again() {
        let (_session, client, rail) = setup();
        complete_handshake(&rail).unwrap();
        complete_handshake(&rail).unwrap();
        assert_eq!(client.sent().len(), 8);
        assert_eq!(client.sent()[4].kind(), OrderKind::Handshake);
    }

    #[test]
    fn test_missing_session() {
        let client = Arc::new(LoopbackClient::new());
        let rail = RailClientContext::new(Arc::clone(&client) as Arc<dyn RailClient>);
        assert_eq!(
            complete_handshake(&rail),
            Err(ChannelError::new(rc::NOT_INITIALIZED))
        );
        assert!(client.sent().is_empty());
    }
}
