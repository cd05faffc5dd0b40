//! Subcommand implementations for the demo driver.

use rand::rngs::OsRng;

use loyalty_client::Client;
use loyalty_server::Server;
use loyalty_types::ProtocolConfig;

fn registered_clients(server: &mut Server, config: ProtocolConfig, count: u32) -> Vec<Client> {
    (0..count)
        .map(|i| {
            let barcode = 1_000_000 + u64::from(i);
            let mut client = Client::new(barcode, config, &mut OsRng);
            client.register_with_server(server, &mut OsRng);
            client
        })
        .collect()
}

pub fn register(config: ProtocolConfig, count: u32) {
    let mut server = Server::new(config);
    let clients = registered_clients(&mut server, config, count);
    log::info!(
        "registered {} users, registry root = {}",
        clients.len(),
        hex::encode(server.root())
    );
}

/// Drive one full transaction: client 0 sends `points` to whichever user
/// the coin-flip selects. Returns the server and the synced clients so
/// callers (e.g. [`settle`]) can keep going.
fn run_transfer(config: ProtocolConfig, user_count: u32, points: i64) -> (Server, Vec<Client>) {
    assert!(user_count >= 2, "need at least two users for a transfer");
    let mut server = Server::new(config);
    let mut clients = registered_clients(&mut server, config, user_count);

    for c in &mut clients {
        c.update_state(&server);
    }

    let hello = clients[0].process_tx_hello(&mut OsRng).expect("tx hello");
    log::info!("client 0 opened tx {}", hex::encode(hello.commit_ic));

    let resp = server
        .process_tx_hello_response(hello, &mut OsRng)
        .expect("server hello response");

    let compute_id = clients[0]
        .process_tx_compute_id(resp)
        .expect("client compute id");

    let barcode_gen = server
        .process_tx_barcode_gen(compute_id)
        .expect("server barcode gen");
    log::info!("server selected recipient uid {}", barcode_gen.uid_b);

    let tx_msg = clients[0]
        .process_tx(barcode_gen, points, &mut OsRng)
        .expect("client builds transfer");

    server.process_tx(tx_msg).expect("server applies transfer");
    log::info!("transfer of {points} points applied");

    (server, clients)
}

pub fn transfer(config: ProtocolConfig, users: u32, points: i64) {
    let (server, _clients) = run_transfer(config, users, points);
    log::info!("registry root after transfer: {}", hex::encode(server.root()));
}

pub fn settle(config: ProtocolConfig, users: u32, points: i64) {
    let (mut server, mut clients) = run_transfer(config, users, points);

    let balance = clients[0]
        .settle_balance(&mut server, &mut OsRng)
        .expect("sender settles");
    log::info!("client 0 settled balance: {balance}");
}
