//! The reschedule primitive used by every policy.

use tracing::trace;
use vt_agent::{AgentStore, Behavior, BehaviorSlot};
use vt_core::{BehaviorId, Scheduled, SimTime};

/// Compute and store the next due time of one behavior, asked at `now`.
///
/// - disabled → `Never`
/// - `next_time(now) > now` (and finite) → `At(next)`
/// - otherwise the behavior is disabled and becomes `Never`
///
/// The result is also written into `slot`, whose generation is bumped.  A
/// behavior therefore can never be scheduled at or before the time it was
/// asked, which rules out zero-duration rescheduling loops.
pub fn reschedule(slot: &mut BehaviorSlot, behavior: &dyn Behavior, now: SimTime) -> Scheduled {
    let scheduled = if !slot.is_enabled() {
        Scheduled::Never
    } else {
        let next = behavior.next_time(now);
        if next > now && next.is_finite() {
            Scheduled::At(next)
        } else {
            slot.set_enabled(false);
            Scheduled::Never
        }
    };
    slot.assign(scheduled);
    scheduled
}

/// [`reschedule`] the behavior `id` inside `store`.  `None` if `id` is unknown.
pub fn reschedule_in(store: &mut AgentStore, id: BehaviorId, now: SimTime) -> Option<Scheduled> {
    let (slot, behavior) = store.schedule_parts(id)?;
    let was_enabled = slot.is_enabled();
    let scheduled   = reschedule(slot, behavior, now);
    if was_enabled && scheduled.is_never() {
        trace!(behavior = %id, %now, "behavior made no progress, disabled");
    }
    Some(scheduled)
}
