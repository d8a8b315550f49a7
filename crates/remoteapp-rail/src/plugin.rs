//! RAIL plugin bootstrap and channel activation.

use std::sync::{Arc, Weak};

use remoteapp_core::{
    ChannelConnectedEvent, RAIL_CHANNEL_NAME, RailEvent, RailSession, RdpContext,
};

use crate::{RailClientContext, RemoteAppHandlers};

/// Wire the RemoteApp handlers into a freshly connected RAIL channel.
///
/// Subscribed to every channel-connected notification of the session, so
/// anything that is not the RAIL channel is ignored.
pub fn channel_connected(session: &Weak<dyn RailSession>, event: &ChannelConnectedEvent) {
    if event.name != RAIL_CHANNEL_NAME {
        return;
    }

    // The interface of the RAIL channel is always its client context.
    let Some(rail) = event.interface.downcast_ref::<RailClientContext>() else {
        tracing::warn!(
            channel = %event.name,
            "RAIL channel connected with an unexpected interface type"
        );
        return;
    };

    rail.register(Weak::clone(session), Arc::new(RemoteAppHandlers));

    if let Some(session) = session.upgrade() {
        session.events().push(RailEvent::ChannelConnected);
    }

    tracing::debug!(channel = %event.name, "RAIL (RemoteApp) channel connected.");
}

/// Load RAIL support for the session and wait for the channel to connect.
///
/// A missing plugin is not fatal: the session carries on without
/// RemoteApp.
pub fn load_plugin<C>(context: &Arc<C>)
where
    C: RdpContext + 'static,
{
    if let Err(e) = context
        .channels()
        .load_channel_plugin(RAIL_CHANNEL_NAME, context.settings())
    {
        tracing::warn!(
            error = %e,
            "Support for the RAIL channel (RemoteApp) could not be loaded. This \
             support normally takes the form of a plugin which is built into the \
             RDP transport. Lacking this support, RemoteApp will not work."
        );
        return;
    }

    let session: Weak<dyn RailSession> = Arc::downgrade(context) as Weak<C>;
    context
        .pubsub()
        .subscribe_channel_connected(move |event| channel_connected(&session, event));

    tracing::debug!("Support for RAIL (RemoteApp) registered. Awaiting channel connection.");
}
