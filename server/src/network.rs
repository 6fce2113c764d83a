//! UDP front end and the driving loop of the authoritative simulation

use crate::client_manager::ClientManager;
use crate::game::{GameWorld, TickReport};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::Packet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Messages sent from network tasks to the main loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    ClientTimeout {
        client_id: u32,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the main loop to the sender task
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
}

/// Main server coordinating networking and the game world
///
/// All world mutation happens on the `run` loop: inbound packets and tick
/// execution are serialized through one `tokio::select!`, which is the
/// mutual exclusion the simulation relies on.
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    world: GameWorld,
    rng: StdRng,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            world: GameWorld::new()?,
            rng: StdRng::from_entropy(),
            tick_duration,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    /// The address the socket actually bound to (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes the outgoing packet queue
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            // Delivery is fire-and-forget; one slow or dead
                            // client never stalls the simulation.
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    async fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts()
                };

                for client_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout { client_id }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket {
            packet: packet.clone(),
            addr,
        }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    /// Processes one inbound packet against the roster and the world
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Join { username, skin } => {
                info!("Join request from {} as {:?}", addr, username);

                // A rejoin from the same address replaces the old player.
                let existing_id = {
                    let clients = self.clients.read().await;
                    clients.find_client_by_addr(addr)
                };
                if let Some(existing_id) = existing_id {
                    info!("Replacing existing client {} from {}", existing_id, addr);
                    self.clients.write().await.remove_client(&existing_id);
                    self.world.remove_player(existing_id);
                }

                let client_id = {
                    let mut clients = self.clients.write().await;
                    clients.add_client(addr)
                };

                let client_id = match client_id {
                    Some(client_id) => client_id,
                    None => {
                        let response = Packet::Rejected {
                            reason: "server full".to_string(),
                        };
                        self.send_packet(&response, addr).await;
                        return;
                    }
                };

                match self.world.add_player(client_id, username, skin, &mut self.rng) {
                    Ok(()) => {
                        let response = Packet::Joined {
                            player_id: client_id,
                        };
                        self.send_packet(&response, addr).await;
                    }
                    Err(e) => {
                        warn!("Could not spawn player for {}: {}", addr, e);
                        self.clients.write().await.remove_client(&client_id);
                        let response = Packet::Rejected {
                            reason: e.to_string(),
                        };
                        self.send_packet(&response, addr).await;
                    }
                }
            }

            Packet::Input { direction } => {
                if !direction.is_finite() {
                    warn!("Discarding non-finite heading from {}", addr);
                    return;
                }

                let client_id = {
                    let mut clients = self.clients.write().await;
                    clients.touch_by_addr(addr)
                };
                if let Some(client_id) = client_id {
                    self.world.handle_input(client_id, direction);
                }
            }

            Packet::Disconnect => {
                let client_id = {
                    let clients = self.clients.read().await;
                    clients.find_client_by_addr(addr)
                };
                if let Some(client_id) = client_id {
                    self.clients.write().await.remove_client(&client_id);
                    self.world.remove_player(client_id);
                }
            }

            _ => {
                warn!("Unexpected server-bound packet from {}", addr);
            }
        }
    }

    /// Sends out everything one tick produced
    ///
    /// Game-over notifications go first, then the per-recipient snapshots.
    /// A missing address means the player disconnected mid-tick and is
    /// silently skipped.
    async fn deliver(&mut self, report: TickReport) {
        for client_id in report.eliminated {
            let addr = {
                let clients = self.clients.read().await;
                clients.addr_of(client_id)
            };
            if let Some(addr) = addr {
                self.send_packet(&Packet::GameOver, addr).await;
                self.clients.write().await.remove_client(&client_id);
            }
        }

        for (client_id, update) in report.snapshots {
            let addr = {
                let clients = self.clients.read().await;
                clients.addr_of(client_id)
            };
            if let Some(addr) = addr {
                self.send_packet(&Packet::GameUpdate(update), addr).await;
            }
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;

        let mut tick_interval = interval(self.tick_duration);
        let mut last_tick = Instant::now();

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id }) => {
                            info!("Client {} timed out", client_id);
                            self.world.remove_player(client_id);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Advance the simulation one tick
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f64();
                    last_tick = now;

                    let report = self.world.tick(dt, wall_clock_ms());
                    self.deliver(report).await;

                    // Periodic performance monitoring
                    if self.world.tick_count() % 300 == 0 {
                        let client_count = {
                            let clients = self.clients.read().await;
                            clients.len()
                        };
                        if client_count > 0 {
                            debug!(
                                "Tick {}: {} clients, {:.1}Hz",
                                self.world.tick_count(),
                                client_count,
                                1.0 / dt
                            );
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

/// Wall-clock milliseconds since the epoch, for snapshot timestamps.
fn wall_clock_ms() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis();
    timestamp.min(u64::MAX as u128) as u64
}
