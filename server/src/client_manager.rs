//! Connection bookkeeping for the shooter server
//!
//! Tracks which network address belongs to which player id, enforces the
//! player capacity limit, and sweeps out clients that stopped sending
//! packets. There is no input buffering here: headings are
//! latest-wins and applied the moment they arrive on the main loop.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// How long a silent client stays connected before being dropped.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// One connected client.
#[derive(Debug)]
pub struct Client {
    /// Unique id assigned by the server; doubles as the player id.
    pub id: u32,
    /// Network address for sending snapshots and notifications.
    pub addr: SocketAddr,
    /// Last time any packet arrived from this client.
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Central roster of connected clients.
///
/// Ids increase monotonically and are never reused, so a stale bullet's
/// parent id can never accidentally point at a newer player.
pub struct ClientManager {
    clients: HashMap<u32, Client>,
    next_client_id: u32,
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a new client, or None when the server is full.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Removes a client. Returns false if it was already gone, which is
    /// routine during death/disconnect races.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("Client {} disconnected", client.id);
            true
        } else {
            false
        }
    }

    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Looks up a client by address and refreshes its activity timestamp.
    pub fn touch_by_addr(&mut self, addr: SocketAddr) -> Option<u32> {
        let client = self
            .clients
            .values_mut()
            .find(|client| client.addr == addr)?;
        client.last_seen = Instant::now();
        Some(client.id)
    }

    pub fn addr_of(&self, client_id: u32) -> Option<SocketAddr> {
        self.clients.get(&client_id).map(|client| client.addr)
    }

    /// Removes every client that exceeded the packet timeout and returns
    /// their ids so the world can drop the matching players.
    pub fn check_timeouts(&mut self) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(CLIENT_TIMEOUT))
            .map(|(id, _)| *id)
            .collect();

        for client_id in &timed_out {
            self.remove_client(client_id);
        }

        timed_out
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
