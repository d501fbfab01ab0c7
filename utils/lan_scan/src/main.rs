use std::io;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

use log::warn;
use lumen::{Client, ClientError, Device, DEFAULT_PORT};

const DISCOVERY_INTERVAL: Duration = Duration::from_secs(300);
const PRINT_INTERVAL: Duration = Duration::from_secs(5);

/// Client identifier stamped into outgoing frames. Any stable nonzero value
/// works; devices just echo it back.
const SOURCE: u32 = 0x736c_616e;

fn print_device(client: &Client<UdpSocket>, device: &Device) {
    if let Some(label) = &device.label {
        print!("{} ({:0>16X} - {})", label, device.target, device.socket_addr());
    } else {
        print!("({:0>16X} - {})", device.target, device.socket_addr());
    }

    if let Some(group) = device
        .group
        .as_ref()
        .and_then(|id| client.directory.group(id))
    {
        print!("  group: {}", group.label);
    }

    let zones = device.zones();
    if !zones.is_empty() {
        print!("  {} zones: ", zones.len());
        for zone in zones {
            match zone.color {
                Some(color) => print!("{} ", color.hue),
                None => print!("?? "),
            }
        }
    }
    println!();
}

fn run() -> Result<(), ClientError> {
    let sock = UdpSocket::bind(("0.0.0.0", DEFAULT_PORT))?;
    sock.set_broadcast(true)?;
    sock.set_read_timeout(Some(Duration::from_secs(1)))?;
    let recv_sock = sock.try_clone()?;

    let mut client = Client::new(sock, SOURCE)?;
    client.discover()?;
    let mut last_discovery = Instant::now();
    let mut last_print = Instant::now();

    let mut buf = [0; 1024];
    loop {
        match recv_sock.recv_from(&mut buf) {
            Ok((nbytes, peer)) => {
                if let Err(e) = client.process_datagram(&buf[0..nbytes], peer) {
                    warn!("error handling datagram from {}: {}", peer, e);
                }
            }
            // read timeout expired, fall through to the periodic work
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e.into()),
        }

        if last_discovery.elapsed() > DISCOVERY_INTERVAL {
            client.discover()?;
            last_discovery = Instant::now();
        }

        if last_print.elapsed() > PRINT_INTERVAL {
            println!();
            for device in client.directory.devices() {
                print_device(&client, device);
            }
            last_print = Instant::now();
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("lan_scan: {}", e);
        std::process::exit(1);
    }
}
