/// Execute an aggregate command deterministically (no IO, no async).
///
/// 1. **Decide**: calls `aggregate.handle(command)` to get events (pure, no mutation)
/// 2. **Evolve**: applies each event to the aggregate via `aggregate.apply(event)`
///
/// Every event is applied before this returns, so callers that notify
/// observers afterwards never expose a half-applied state. A rejected command
/// leaves the aggregate untouched.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: cafecart_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    tracing::trace!(applied = events.len(), "command executed");
    Ok(events)
}
