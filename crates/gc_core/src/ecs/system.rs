//! The tick contract a system implements (spec.md §6).

use super::world::World;

/// Logic that runs once per tick over a declared set of component classes.
///
/// Implementors query `world` themselves inside `process` (see
/// [`World::query1`], [`World::query2`], [`World::query3`]) rather than
/// receiving a pre-built match list, which keeps borrow-splitting explicit
/// at each call site instead of forcing the dispatcher to hand back
/// borrowed tuples of unrelated lifetimes.
pub trait System {
    /// Per-system throttle (spec.md §4.5/§4.7/§4.10). Defaults to running
    /// every tick.
    fn should_process(&mut self, _tick: i64) -> bool {
        true
    }

    fn process(&mut self, tick: i64, world: &mut World);
}
