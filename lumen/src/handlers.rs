//! The default handler set: discovery bookkeeping plus label, group, and
//! zone state tracking.

use std::convert::TryFrom;
use std::net::SocketAddr;

use log::{debug, warn};
use lumen_core::{Message, RawMessage, Service};

use crate::client::Client;
use crate::directory::Device;
use crate::error::ClientError;
use crate::registry::Registry;
use crate::transport::Transport;

/// Builds a registry with handlers for the messages the directory is built
/// from: StateService, StateLabel, StateGroup, LightState, StateZone, and
/// StateMultiZone.
pub fn default_registry<T: Transport>() -> Result<Registry<T>, ClientError> {
    let mut registry = Registry::new();
    registry.register(3, on_state_service)?;
    registry.register(25, on_state_label)?;
    registry.register(53, on_state_group)?;
    registry.register(107, on_light_state)?;
    registry.register(503, on_state_zone)?;
    registry.register(506, on_state_multi_zone)?;
    Ok(registry)
}

/// Resolves the device the datagram came from, creating it on first
/// contact. The frame target doubles as the device's unicast address.
fn device_for<'a, T>(
    client: &'a mut Client<T>,
    raw: &RawMessage,
    peer: SocketAddr,
) -> &'a mut Device {
    let (inserted, device) = client.directory.get_or_insert_device(peer.ip());
    if inserted {
        debug!("new device at {}", peer.ip());
    }
    if raw.frame_addr.target != 0 {
        device.target = raw.frame_addr.target;
    }
    device
}

/// A device answered discovery: record its port and query its label, group,
/// and zone layout.
fn on_state_service<T: Transport>(
    client: &mut Client<T>,
    raw: &RawMessage,
    msg: Message,
    peer: SocketAddr,
) -> Result<(), ClientError> {
    if let Message::StateService { service, port } = msg {
        if service != Service::UDP {
            return Ok(());
        }
        // port zero means the service is unavailable right now
        let port = match u16::try_from(port) {
            Ok(0) | Err(_) => {
                debug!("ignoring StateService from {} with port {}", peer, port);
                return Ok(());
            }
            Ok(port) => port,
        };

        let device = device_for(client, raw, peer);
        device.port = port;
        let target = device.target;
        let addr = device.socket_addr();

        // discovery side effect: a failed query is logged, not fatal
        for query in [
            Message::GetLabel,
            Message::GetGroup,
            Message::GetColorZones {
                start_index: 0,
                end_index: 255,
            },
        ]
        .iter()
        {
            if let Err(e) = client.send_to(query, target, addr) {
                warn!("failed to query {}: {}", addr, e);
            }
        }
    }
    Ok(())
}

fn on_state_label<T>(
    client: &mut Client<T>,
    raw: &RawMessage,
    msg: Message,
    peer: SocketAddr,
) -> Result<(), ClientError> {
    if let Message::StateLabel { label } = msg {
        device_for(client, raw, peer).label = Some(label);
    }
    Ok(())
}

fn on_state_group<T>(
    client: &mut Client<T>,
    raw: &RawMessage,
    msg: Message,
    peer: SocketAddr,
) -> Result<(), ClientError> {
    if let Message::StateGroup {
        group,
        label,
        updated_at,
    } = msg
    {
        device_for(client, raw, peer).group = Some(group);
        client.directory.record_group(group, label, updated_at);
    }
    Ok(())
}

/// Light state is logged, not stored: devices report intermediate power and
/// color values mid-transition, so a cached copy would usually be stale.
fn on_light_state<T>(
    _client: &mut Client<T>,
    _raw: &RawMessage,
    msg: Message,
    peer: SocketAddr,
) -> Result<(), ClientError> {
    if let Message::LightState {
        color,
        power,
        label,
        ..
    } = msg
    {
        debug!(
            "light at {} ({}): power {}, color {:?}",
            peer.ip(),
            label,
            power,
            color
        );
    }
    Ok(())
}

fn on_state_zone<T>(
    client: &mut Client<T>,
    raw: &RawMessage,
    msg: Message,
    peer: SocketAddr,
) -> Result<(), ClientError> {
    if let Message::StateZone {
        count,
        index,
        color,
    } = msg
    {
        device_for(client, raw, peer)
            .get_or_create_zone(usize::from(index), usize::from(count))?
            .color = Some(color);
    }
    Ok(())
}

fn on_state_multi_zone<T>(
    client: &mut Client<T>,
    raw: &RawMessage,
    msg: Message,
    peer: SocketAddr,
) -> Result<(), ClientError> {
    if let Message::StateMultiZone {
        count,
        index,
        colors,
    } = msg
    {
        let device = device_for(client, raw, peer);
        for (n, color) in colors.iter().enumerate() {
            device
                .get_or_create_zone(usize::from(index) + n, usize::from(count))?
                .color = Some(*color);
        }
    }
    Ok(())
}
