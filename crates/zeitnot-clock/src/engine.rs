//! The clock engine
//!
//! [`ClockEngine`] ties the pure [`ClockState`] to its environment: a
//! monotonic clock, a wake scheduler for the zero-expiration watchdog, and a
//! listener table for synchronous notification dispatch.
//!
//! Single-threaded, single-ownership: the engine is an `Rc` handle; cloning
//! it shares the same state. Listeners run after the state borrow is
//! released, inside the mutating call, so a handler may freely query or even
//! mutate the engine re-entrantly, and always observes fully-updated state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use zeitnot_core::{
    ClockEvent, ClockInstant, ClockResult, ClockTime, Color, EventKind, TimeControl,
};

use crate::scheduler::{MonotonicClock, WakeScheduler};
use crate::state::ClockState;
use crate::watchdog::{self, ZeroWatch, RESCHEDULE_EPSILON, ZERO_GUARD};

/// Handle identifying a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Rc<dyn Fn(&ClockEvent)>;

struct ListenerEntry {
    id: ListenerId,
    filter: Option<EventKind>,
    callback: Callback,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

impl ListenerTable {
    fn insert(&mut self, filter: Option<EventKind>, callback: Callback) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(ListenerEntry {
            id,
            filter,
            callback,
        });
        id
    }

    fn remove(&mut self, id: ListenerId) {
        self.entries.retain(|e| e.id != id);
    }

    /// Callbacks interested in `event`, snapshotted so handlers may
    /// subscribe or unsubscribe while dispatch is in flight.
    fn snapshot(&self, event: &ClockEvent) -> Vec<Callback> {
        self.entries
            .iter()
            .filter(|e| e.filter.is_none() || e.filter == Some(event.kind()))
            .map(|e| Rc::clone(&e.callback))
            .collect()
    }
}

fn dispatch_event(listeners: &Rc<RefCell<ListenerTable>>, event: &ClockEvent) {
    let snapshot = listeners.borrow().snapshot(event);
    for callback in snapshot {
        callback(event);
    }
}

enum WatchAction {
    Keep,
    Cancel,
    Replace {
        color: Color,
        due: ClockInstant,
        generation: u64,
    },
}

/// Dual-player chess clock: tracks remaining thinking time across a game,
/// enforces increment and delayed-start rules, supports pause/resume/undo,
/// and announces expiration exactly once through its listeners.
#[derive(Clone)]
pub struct ClockEngine {
    state: Rc<RefCell<ClockState>>,
    listeners: Rc<RefCell<ListenerTable>>,
    clock: Rc<dyn MonotonicClock>,
    scheduler: Rc<dyn WakeScheduler>,
}

impl ClockEngine {
    /// Create an engine for one game. One engine per game; the watchdog
    /// state is never shared across instances.
    pub fn new(
        control: TimeControl,
        clock: Rc<dyn MonotonicClock>,
        scheduler: Rc<dyn WakeScheduler>,
    ) -> Self {
        ClockEngine {
            state: Rc::new(RefCell::new(ClockState::new(control))),
            listeners: Rc::new(RefCell::new(ListenerTable::default())),
            clock,
            scheduler,
        }
    }

    // ── Listeners ──────────────────────────────────────────────────────────

    /// Register a listener for every event
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&ClockEvent) + 'static,
    {
        self.listeners.borrow_mut().insert(None, Rc::new(callback))
    }

    /// Register a listener for one event kind
    pub fn subscribe_kind<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&ClockEvent) + 'static,
    {
        self.listeners
            .borrow_mut()
            .insert(Some(kind), Rc::new(callback))
    }

    /// Remove a listener. No-op for unknown ids.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(id);
    }

    // ── Mutations ──────────────────────────────────────────────────────────

    /// The moving player completed a ply. No-op while paused or ended.
    pub fn tap(&self) {
        let now = self.clock.now();
        let events = self.state.borrow_mut().tap(now);
        self.finish(events);
    }

    /// Begin the countdown immediately, bypassing the delayed-start rule.
    pub fn start(&self) {
        let now = self.clock.now();
        let events = self.state.borrow_mut().start(now);
        self.finish(events);
    }

    /// Freeze both clocks.
    pub fn pause(&self) {
        let now = self.clock.now();
        let events = self.state.borrow_mut().pause(now);
        self.finish(events);
    }

    /// Resume after a pause, preserving the mover's elapsed time.
    pub fn resume(&self) {
        let now = self.clock.now();
        let events = self.state.borrow_mut().resume(now);
        self.finish(events);
    }

    /// Freeze the clock permanently. Irreversible; all later mutations are
    /// silent no-ops while the series stay readable.
    pub fn end(&self) {
        let now = self.clock.now();
        let events = self.state.borrow_mut().end(now);
        self.finish(events);
    }

    /// Rewind exactly `n` completed plies, all-or-nothing.
    pub fn undo_plies(&self, n: usize) -> ClockResult<()> {
        let now = self.clock.now();
        let events = self.state.borrow_mut().undo_plies(n, now)?;
        self.finish(events);
        Ok(())
    }

    /// External override of a player's remaining time.
    pub fn set_remaining(&self, color: Color, value: ClockTime) {
        let now = self.clock.now();
        let events = self.state.borrow_mut().set_remaining(color, value, now);
        self.finish(events);
    }

    /// External override of the active mover (position setup).
    pub fn set_moving_color(&self, color: Color) {
        let events = self.state.borrow_mut().set_moving_color(color);
        self.finish(events);
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Remaining time on a player's latest ply (live for the running mover).
    /// A value at or below zero means the flag has fallen.
    pub fn remaining(&self, color: Color) -> ClockTime {
        self.state.borrow().remaining(color, self.clock.now())
    }

    /// Raw recorded value at a historical ply index for that color
    pub fn remaining_at(&self, color: Color, index: usize) -> Option<ClockTime> {
        self.state.borrow().remaining_at(color, index)
    }

    /// White's starting allocation
    pub fn initial_time(&self) -> ClockTime {
        self.state.borrow().initial_time()
    }

    /// Wall-clock time a given 1-based ply consumed
    pub fn elapsed_move_time(&self, ply: usize) -> ClockTime {
        self.state.borrow().elapsed_move_time(ply)
    }

    /// Completed plies since game start
    pub fn ply(&self) -> usize {
        self.state.borrow().ply()
    }

    /// Has any move time been recorded?
    pub fn has_times(&self) -> bool {
        self.state.borrow().has_times()
    }

    /// Are at least `bcount` Black and `wcount` White plies recorded?
    pub fn has_bw_times(&self, bcount: usize, wcount: usize) -> bool {
        self.state.borrow().has_bw_times(bcount, wcount)
    }

    pub fn moving_color(&self) -> Color {
        self.state.borrow().moving_color()
    }

    pub fn is_started(&self) -> bool {
        self.state.borrow().is_started()
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().is_paused()
    }

    pub fn is_ended(&self) -> bool {
        self.state.borrow().is_ended()
    }

    /// The immutable time control this engine was created with
    pub fn control(&self) -> TimeControl {
        *self.state.borrow().control()
    }

    /// Human-readable control summary, e.g. "5 min + 3 sec"
    pub fn display_text(&self) -> String {
        self.state.borrow().control().display_text()
    }

    // ── Watchdog ───────────────────────────────────────────────────────────

    /// Recompute the zero-watch and dispatch pending notifications. Invoked
    /// after every mutation, including no-ops (the epsilon check makes a
    /// redundant recompute keep the pending wake).
    fn finish(&self, events: Vec<ClockEvent>) {
        self.rearm();
        for event in &events {
            dispatch_event(&self.listeners, event);
        }
    }

    fn rearm(&self) {
        let now = self.clock.now();

        let (action, stale) = {
            let mut state = self.state.borrow_mut();
            let next = if state.is_ended() || state.is_paused() {
                None
            } else {
                watchdog::next_deadline(&state, now)
            };

            match next {
                None => {
                    let stale = state.watch.take().map(|w| w.token);
                    (WatchAction::Cancel, stale)
                }
                Some((color, due)) => {
                    let keep = state
                        .watch
                        .as_ref()
                        .is_some_and(|w| w.color == color && w.due.abs_diff(due) <= RESCHEDULE_EPSILON);
                    if keep {
                        (WatchAction::Keep, None)
                    } else {
                        let stale = state.watch.take().map(|w| w.token);
                        let generation = state.next_generation();
                        (
                            WatchAction::Replace {
                                color,
                                due,
                                generation,
                            },
                            stale,
                        )
                    }
                }
            }
        };

        if let Some(token) = stale {
            self.scheduler.cancel(token);
        }

        if let WatchAction::Replace {
            color,
            due,
            generation,
        } = action
        {
            let delay = (due - now).to_duration() + ZERO_GUARD;
            let token = self
                .scheduler
                .schedule(delay, Box::new(self.wake(color, generation)));
            self.state.borrow_mut().watch = Some(ZeroWatch {
                token,
                due,
                color,
                generation,
            });
        }
    }

    /// The deferred wake. Holds only weak references: a dropped engine, a
    /// superseded generation, or an ended clock all make firing a silent
    /// no-op, and a stale reading means some mutation raced the wake and has
    /// already recomputed the watch.
    fn wake(&self, color: Color, generation: u64) -> impl FnOnce() + 'static {
        let state = Rc::downgrade(&self.state);
        let listeners = Rc::downgrade(&self.listeners);
        let clock = Rc::clone(&self.clock);

        move || {
            let Some(state) = state.upgrade() else { return };
            let expired = {
                let mut s = state.borrow_mut();
                let live = s.watch.as_ref().is_some_and(|w| w.generation == generation);
                if !live || s.is_ended() {
                    return;
                }
                s.watch = None;
                s.remaining(color, clock.now()).is_expired()
            };

            if expired {
                tracing::debug!(%color, "flag fell");
                if let Some(listeners) = listeners.upgrade() {
                    dispatch_event(&listeners, &ClockEvent::ZeroReached(color));
                }
            }
        }
    }
}

impl fmt::Debug for ClockEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        let now = self.clock.now();
        write!(
            f,
            "<ClockEngine white:{:?} black:{:?} ended={}>",
            state.remaining(Color::White, now),
            state.remaining(Color::Black, now),
            state.is_ended()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    use crate::manual::{ManualClock, ManualScheduler};

    struct Fixture {
        clock: Rc<ManualClock>,
        scheduler: Rc<ManualScheduler>,
        engine: ClockEngine,
        events: Rc<RefCell<Vec<ClockEvent>>>,
    }

    fn fixture(initial_secs: f64, increment_secs: f64) -> Fixture {
        let clock = ManualClock::new();
        let scheduler = ManualScheduler::new(Rc::clone(&clock));
        let engine = ClockEngine::new(
            TimeControl::new(initial_secs, increment_secs).unwrap(),
            Rc::clone(&clock) as Rc<dyn MonotonicClock>,
            Rc::clone(&scheduler) as Rc<dyn WakeScheduler>,
        );

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(move |e| sink.borrow_mut().push(*e));

        Fixture {
            clock,
            scheduler,
            engine,
            events,
        }
    }

    fn zero_events(events: &[ClockEvent]) -> Vec<ClockEvent> {
        events
            .iter()
            .copied()
            .filter(|e| e.kind() == EventKind::Zero)
            .collect()
    }

    #[test]
    fn test_five_minute_scenario() {
        let f = fixture(300.0, 0.0);

        f.engine.tap();
        assert!(!f.engine.is_started());
        assert_eq!(f.engine.ply(), 1);

        f.engine.tap();
        assert!(f.engine.is_started());
        assert_eq!(f.engine.ply(), 2);
        assert_eq!(f.engine.remaining(Color::White), ClockTime::from_secs(300));

        f.scheduler.advance(Duration::from_secs(10));
        f.engine.tap();
        assert_eq!(
            f.engine.remaining_at(Color::White, 2),
            Some(ClockTime::from_secs(290))
        );
    }

    #[test]
    fn test_zero_reached_within_guard() {
        let f = fixture(300.0, 0.0);
        f.engine.tap();
        f.engine.tap();

        f.engine
            .set_remaining(Color::White, ClockTime::from_secs_f64(0.5));

        // Not before the deadline...
        f.scheduler.advance(Duration::from_millis(400));
        assert!(zero_events(&f.events.borrow()).is_empty());

        // ...but within the guard interval after it
        f.scheduler.advance(Duration::from_millis(100) + ZERO_GUARD);
        assert_eq!(
            zero_events(&f.events.borrow()),
            vec![ClockEvent::ZeroReached(Color::White)]
        );
    }

    #[test]
    fn test_zero_reached_at_most_once_per_expiry() {
        let f = fixture(300.0, 0.0);
        f.engine.tap();
        f.engine.tap();
        f.engine
            .set_remaining(Color::White, ClockTime::from_secs_f64(0.2));

        f.scheduler.advance(Duration::from_secs(3600));
        assert_eq!(zero_events(&f.events.borrow()).len(), 1);
        assert_eq!(f.scheduler.pending_count(), 0);

        // Queries keep reporting the fallen flag without re-announcing it
        assert!(f.engine.remaining(Color::White).is_expired());
        assert!(zero_events(&f.events.borrow()).len() == 1);
    }

    #[test]
    fn test_tap_supersedes_scheduled_wake() {
        let f = fixture(300.0, 5.0);
        f.engine.tap();
        f.engine.tap();
        f.engine
            .set_remaining(Color::White, ClockTime::from_secs_f64(0.5));

        // White moves before expiring; the gain lifts the new value well clear
        f.scheduler.advance(Duration::from_millis(300));
        f.engine.tap();

        f.scheduler.advance(Duration::from_secs(2));
        assert!(zero_events(&f.events.borrow()).is_empty());
        // A fresh watch is pending for the new projection
        assert_eq!(f.scheduler.pending_count(), 1);
    }

    #[test]
    fn test_pause_cancels_watch_resume_rearms() {
        let f = fixture(300.0, 0.0);
        f.engine.tap();
        f.engine.tap();
        assert_eq!(f.scheduler.pending_count(), 1);

        f.engine.pause();
        assert_eq!(f.scheduler.pending_count(), 0);

        // Nothing fires while frozen
        f.scheduler.advance(Duration::from_secs(3600));
        assert!(zero_events(&f.events.borrow()).is_empty());

        f.engine.resume();
        assert_eq!(f.scheduler.pending_count(), 1);
        assert_eq!(f.engine.remaining(Color::White), ClockTime::from_secs(300));
    }

    #[test]
    fn test_end_cancels_watch_permanently() {
        let f = fixture(300.0, 0.0);
        f.engine.tap();
        f.engine.tap();
        f.engine.end();

        assert_eq!(f.scheduler.pending_count(), 0);
        f.scheduler.advance(Duration::from_secs(3600));
        assert!(zero_events(&f.events.borrow()).is_empty());
    }

    #[test]
    fn test_undo_rearms_after_expiry() {
        let f = fixture(300.0, 0.0);
        f.engine.tap();
        f.engine.tap();
        f.scheduler.advance(Duration::from_secs(10));
        f.engine.tap(); // White recorded at 290

        f.engine
            .set_remaining(Color::Black, ClockTime::from_secs_f64(0.1));
        f.scheduler.advance(Duration::from_secs(5));
        assert_eq!(
            zero_events(&f.events.borrow()),
            vec![ClockEvent::ZeroReached(Color::Black)]
        );

        // Undoing White's move restores Black's recorded 300s and re-arms
        f.engine.undo_plies(1).unwrap();
        assert_eq!(f.scheduler.pending_count(), 1);
        assert!(!f.engine.remaining(Color::Black).is_expired());

        // The flag can fall again in the future
        f.scheduler.advance(Duration::from_secs(400));
        assert_eq!(zero_events(&f.events.borrow()).len(), 2);
    }

    #[test]
    fn test_redundant_recompute_keeps_pending_wake() {
        let f = fixture(300.0, 0.0);
        f.engine.tap();
        f.engine.tap();

        // The mover's projection is unchanged by a same-instant recompute
        let before = f.scheduler.pending_count();
        f.engine.set_moving_color(f.engine.moving_color());
        assert_eq!(f.scheduler.pending_count(), before);
    }

    #[test]
    fn test_listener_sees_updated_state() {
        let f = fixture(300.0, 0.0);
        let seen_ply = Rc::new(Cell::new(usize::MAX));

        let engine = f.engine.clone();
        let seen = Rc::clone(&seen_ply);
        f.engine.subscribe_kind(EventKind::Player, move |_| {
            seen.set(engine.ply());
        });

        f.engine.tap();
        assert_eq!(seen_ply.get(), 1);
        f.engine.tap();
        assert_eq!(seen_ply.get(), 2);
    }

    #[test]
    fn test_reentrant_subscribe_and_unsubscribe() {
        let f = fixture(300.0, 0.0);
        let engine = f.engine.clone();
        let added = Rc::new(Cell::new(false));

        let added_flag = Rc::clone(&added);
        let id = f.engine.subscribe(move |_| {
            if !added_flag.get() {
                added_flag.set(true);
                engine.subscribe(|_| {});
            }
        });

        f.engine.tap();
        assert!(added.get());
        f.engine.unsubscribe(id);
        f.engine.tap();
    }

    #[test]
    fn test_kind_filtered_subscription() {
        let f = fixture(300.0, 0.0);
        let pauses = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&pauses);
        f.engine.subscribe_kind(EventKind::Pause, move |e| {
            sink.borrow_mut().push(*e);
        });

        f.engine.tap();
        f.engine.tap();
        f.engine.pause();
        f.engine.resume();

        assert_eq!(
            *pauses.borrow(),
            vec![ClockEvent::PauseChanged(true), ClockEvent::PauseChanged(false)]
        );
    }

    #[test]
    fn test_engine_debug_summary() {
        let f = fixture(300.0, 0.0);
        let text = format!("{:?}", f.engine);
        assert!(text.contains("white:+300.000s"));
        assert!(text.contains("ended=false"));
    }

    #[test]
    fn test_display_text_delegates_to_control() {
        let f = fixture(300.0, 3.0);
        assert_eq!(f.engine.display_text(), "5 min + 3 sec");
    }
}
