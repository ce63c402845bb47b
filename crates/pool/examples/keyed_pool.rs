//! Keyed pooling example.
//!
//! Simulates a small fleet of database connections shared across two
//! endpoints, then shuts the pool down.

use tarn_pool::{PoolConfig, ServicePool, Stoppable};

/// Pretend database connection.
#[derive(Debug)]
struct Connection {
    endpoint: &'static str,
    serial: u32,
}

impl Connection {
    fn open(endpoint: &'static str, serial: u32) -> Self {
        println!("  opening {endpoint}#{serial}");
        Self { endpoint, serial }
    }

    fn query(&self) {
        println!("  querying over {}#{}", self.endpoint, self.serial);
    }
}

impl Stoppable for Connection {
    type Error = std::convert::Infallible;

    fn stop(&mut self) -> Result<(), Self::Error> {
        println!("  closing {}#{}", self.endpoint, self.serial);
        Ok(())
    }
}

/// Reuse an idle connection when one is parked, otherwise open a new one.
fn checkout(
    pool: &ServicePool<&'static str, Connection>,
    endpoint: &'static str,
    serial: u32,
) -> Connection {
    match pool.acquire(&endpoint) {
        Some(conn) => conn,
        None => match pool.add_and_acquire(endpoint, Connection::open(endpoint, serial)) {
            Ok(conn) => conn,
            Err(refused) => {
                // The pool is full for this endpoint; run unpooled.
                println!("  {refused}");
                refused.into_service()
            }
        },
    }
}

fn main() {
    println!("=== Keyed Service Pool Example ===\n");

    let pool = ServicePool::new(PoolConfig::with_capacity(2));
    pool.start();

    println!("Opening connections for two endpoints:");
    let primary_a = checkout(&pool, "primary", 1);
    let primary_b = checkout(&pool, "primary", 2);
    let replica_a = checkout(&pool, "replica", 3);
    primary_a.query();
    primary_b.query();
    replica_a.query();

    println!("\nParking them for reuse:");
    pool.release(&"primary", primary_a);
    pool.release(&"primary", primary_b);
    pool.release(&"replica", replica_a);
    println!("  {} connections idle", pool.size());

    println!("\nThe next checkout reuses the oldest idle connection:");
    let reused = checkout(&pool, "primary", 4);
    reused.query();
    pool.release(&"primary", reused);

    println!("\nAdmission is refused once an endpoint's idle store is full:");
    match pool.add_and_acquire("primary", Connection::open("primary", 5)) {
        Ok(_) => unreachable!("the primary store is full"),
        Err(refused) => {
            println!("  {refused}");
            // The caller keeps the unpooled connection and closes it itself.
            let mut unpooled = refused.into_service();
            let _ = unpooled.stop();
        }
    }

    println!("\nStopping the pool closes every idle connection:");
    pool.stop();
    println!("  {} connections idle", pool.size());

    println!("\n=== Example completed! ===");
}
