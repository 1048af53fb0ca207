//! Sharing parsed queries between threads with QueryCache
//!
//! Run with: RUST_LOG=declared_query=debug cargo run --example cache

use declared_query::prelude::*;

const QUERIES: &[&str] = &[
    "select u from User u where u.lastname = :lastname",
    "select u from User u where u.firstname like %:firstname%",
    "select o from Order o where o.customer.id = ?1 order by o.placed desc",
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cache = QueryCache::new();

    std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let cache = &cache;
                scope.spawn(move || run_worker(cache, worker))
            })
            .collect();

        workers
            .into_iter()
            .try_for_each(|handle| handle.join().expect("worker panicked"))
    })?;

    println!("\n{} queries cached", cache.len());
    Ok(())
}

fn run_worker(cache: &QueryCache, worker: usize) -> Result<()> {
    for text in QUERIES {
        let query = DeclaredQuery::jpql(*text);
        let parsed = cache.get_or_parse(&query)?;
        let count = cache.get_or_derive_count(&query, &CountProjection::Derived)?;
        println!(
            "worker {worker}: {} binding(s), count: {}",
            parsed.bindings().len(),
            count.query_text()
        );
    }
    Ok(())
}
