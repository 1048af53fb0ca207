//! Basic example demonstrating DeclaredQuery usage
//!
//! Run with: cargo run --example basic
//!
//! Set RUST_LOG=declared_query=trace to see how every binding is registered.

use declared_query::{CountProjection, DeclaredQuery};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Example 1: Named parameters with wildcards
    println!("--- Example 1: Named parameters ---");
    let query = DeclaredQuery::jpql(
        "select u from User u where u.lastname like %:name% or u.firstname like :name% or u.email = :email",
    )
    .parse()?;

    println!("Rewritten: {}", query.query_text());
    for binding in query.bindings() {
        println!("  - {binding}");
    }
    println!("Value for {}: {}", query.bindings()[0].identifier(), query.bindings()[0].prepare("smi"));

    // Example 2: Positional parameters are numbered by first appearance
    println!("\n--- Example 2: Positional parameters ---");
    let query = DeclaredQuery::jpql("select u from User u where u.age > ?2 and u.name like ?1%").parse()?;

    println!("Rewritten: {}", query.query_text());
    for binding in query.bindings() {
        println!("  - {binding}");
    }

    // Example 3: Expressions evaluated by the caller at bind time
    println!("\n--- Example 3: Expressions ---");
    let query = DeclaredQuery::jpql(
        "select a from Article a where a.tag in :#{#tags} and a.owner = :#{principal.name}",
    )
    .parse()?;

    println!("Rewritten: {}", query.query_text());
    for binding in query.bindings() {
        println!("  - {} evaluates {:?}", binding.identifier(), binding.expression());
    }

    // Example 4: Count query for paging
    println!("\n--- Example 4: Count query ---");
    let query = DeclaredQuery::jpql(
        "select u from User u where (:logins) is null or lower(u.login) in (:logins) order by u.login",
    )
    .parse()?;
    let count = query.derive_count_query(&CountProjection::Derived)?;

    println!("Source: {}", query.query_text());
    println!("Count:  {}", count.query_text());
    for binding in count.bindings() {
        println!("  - {binding}");
    }

    // Example 5: Native query metadata
    println!("\n--- Example 5: Native query ---");
    let query = DeclaredQuery::native("select * from users u where u.name = ?").parse()?;
    println!("Rewritten: {}", query.query_text());
    println!("Alias: {:?}, jdbc style: {}", query.alias(), query.uses_jdbc_style_parameters());
    println!("Count: {}", query.derive_count_query(&CountProjection::Derived)?.query_text());

    // Example 6: Errors carry the offending query
    println!("\n--- Example 6: Errors ---");
    if let Err(err) = DeclaredQuery::jpql("select u from User u where u.a = ? and u.b = ?1").parse() {
        println!("Rejected: {err}");
    }

    println!("\nExample completed successfully!");
    Ok(())
}
