//! In-memory directory of discovered devices, their groups, and zone state.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use lumen_core::{Ident, Label, HSBK};

use crate::error::ClientError;
use crate::DEFAULT_PORT;

/// One zone of a multizone device. Color is unknown until a StateZone or
/// StateMultiZone reports it.
#[derive(Debug, Default, Clone)]
pub struct Zone {
    pub color: Option<HSBK>,
}

/// A device discovered on the network.
///
/// Devices are identified by the address their datagrams come from; replies
/// are matched only by sender address, never by sequence or source.
#[derive(Debug)]
pub struct Device {
    pub addr: IpAddr,
    /// Port for unicast messages. The well-known port until a StateService
    /// reports the device's actual one.
    pub port: u16,
    /// MAC-derived id from the frame address, zero until a message reveals
    /// it. Used as the target of unicast frames.
    pub target: u64,
    pub label: Option<Label>,
    pub group: Option<Ident>,
    zones: Vec<Zone>,
}

impl Device {
    pub fn new(addr: IpAddr) -> Device {
        Device {
            addr,
            port: DEFAULT_PORT,
            target: 0,
            label: None,
            group: None,
            zones: Vec::new(),
        }
    }

    /// Where to send unicast messages for this device.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }

    /// Zones reported so far, in index order. Empty for single-zone devices.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Returns the zone at `index`, growing the zone list to `count` first.
    ///
    /// Zone messages always carry the device's total zone count, so the list
    /// grows lazily to the largest count seen and existing entries are kept.
    /// An index at or past the count is a malformed message.
    pub fn get_or_create_zone(
        &mut self,
        index: usize,
        count: usize,
    ) -> Result<&mut Zone, ClientError> {
        if index >= count {
            return Err(ClientError::ZoneOutOfBounds { index, count });
        }
        if count > self.zones.len() {
            self.zones.resize_with(count, Zone::default);
        }
        Ok(&mut self.zones[index])
    }
}

/// A device group, keyed by its 16-byte id.
#[derive(Debug)]
pub struct Group {
    pub label: Label,
    pub updated_at: u64,
}

/// Everything the client has learned about the network.
#[derive(Debug, Default)]
pub struct Directory {
    devices: HashMap<IpAddr, Device>,
    groups: HashMap<Ident, Group>,
}

impl Directory {
    pub fn new() -> Directory {
        Directory::default()
    }

    pub fn device(&self, addr: IpAddr) -> Option<&Device> {
        self.devices.get(&addr)
    }

    pub fn device_mut(&mut self, addr: IpAddr) -> Option<&mut Device> {
        self.devices.get_mut(&addr)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Looks up a device by address, inserting a fresh entry if the address
    /// is new. Returns whether the device was newly inserted along with the
    /// entry.
    pub fn get_or_insert_device(&mut self, addr: IpAddr) -> (bool, &mut Device) {
        let mut inserted = false;
        let device = self.devices.entry(addr).or_insert_with(|| {
            inserted = true;
            Device::new(addr)
        });
        (inserted, device)
    }

    pub fn group(&self, id: &Ident) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&Ident, &Group)> {
        self.groups.iter()
    }

    /// Records a group's label, keeping the newest one when devices disagree
    /// about a group they are all members of.
    pub fn record_group(&mut self, id: Ident, label: Label, updated_at: u64) {
        match self.groups.get_mut(&id) {
            Some(group) if group.updated_at >= updated_at => {}
            Some(group) => {
                group.label = label;
                group.updated_at = updated_at;
            }
            None => {
                self.groups.insert(id, Group { label, updated_at });
            }
        }
    }
}
