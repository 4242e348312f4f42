//! Stimulus and sampling processes shared by the scenario tests.

use std::cell::RefCell;
use std::rc::Rc;

use lockstep_common::{SignalId, SimTime, Value};
use lockstep_sim::{process_fn, CallbackLoop, ProcessBox, Step, Trigger};
use tracing::trace;

/// `(time, value)` pairs collected by a sampler.
pub type Samples = Rc<RefCell<Vec<(SimTime, u128)>>>;

/// Samples `signal` every `period`, half a period out of phase with a clock
/// that rises at `period / 2`. Each sample is taken in the ReadOnly phase,
/// before the edge at that instant updates any register.
pub fn periodic_sampler(signal: SignalId, period: SimTime, samples: Samples) -> ProcessBox {
    #[derive(Clone, Copy)]
    enum State {
        Start,
        Offset,
        Wait,
        Record,
    }

    let mut state = State::Start;
    process_fn("periodic-sampler", move |ctx| {
        let (next, trigger) = match state {
            State::Start => (State::Offset, Trigger::Timer(period / 2)),
            State::Offset => (State::Wait, Trigger::Timer(period)),
            State::Wait => (State::Record, Trigger::ReadOnly),
            State::Record => {
                let value = ctx.read_u128(signal)?;
                trace!(time = ctx.now(), value, "sample");
                samples.borrow_mut().push((ctx.now(), value));
                (State::Wait, Trigger::Timer(period))
            }
        };
        state = next;
        Ok(Step::Wait(trigger))
    })
}

/// Samples `signal` on every rising edge of `clk` while the active-high
/// `rst` is low.
pub fn sync_sampler(
    signal: SignalId,
    clk: SignalId,
    rst: SignalId,
    samples: Samples,
) -> ProcessBox {
    CallbackLoop::on_rising(clk, move || {
        let samples = Rc::clone(&samples);
        let mut started = false;
        process_fn("sync-sampler", move |ctx| {
            if !started {
                started = true;
                return Ok(Trigger::ReadOnly.into());
            }
            if !ctx.read_bool(rst)? {
                samples.borrow_mut().push((ctx.now(), ctx.read_u128(signal)?));
            }
            Ok(Step::Done)
        })
    })
    .with_name("sync-sampler-loop")
    .boxed()
}

/// Drives `signal` low, then raises it at the first check where the
/// active-high `rst` is released. The reset is polled every `period`.
pub fn pull_up_after_reset(signal: SignalId, rst: SignalId, period: SimTime) -> ProcessBox {
    #[derive(Clone, Copy)]
    enum State {
        Start,
        Init,
        Check,
        Retry,
        Release,
        Finished,
    }

    let mut state = State::Start;
    process_fn("pull-up-after-reset", move |ctx| {
        let (next, step): (State, Step) = match state {
            State::Start => (State::Init, Trigger::WriteOnly.into()),
            State::Init => {
                ctx.write(signal, Value::ZERO)?;
                (State::Check, Trigger::ReadOnly.into())
            }
            State::Check => {
                if ctx.read_bool(rst)? {
                    (State::Retry, Trigger::Timer(period).into())
                } else {
                    (State::Release, Trigger::WriteOnly.into())
                }
            }
            State::Retry => (State::Check, Trigger::ReadOnly.into()),
            State::Release => {
                ctx.write(signal, Value::ONE)?;
                (State::Finished, Step::Done)
            }
            State::Finished => (State::Finished, Step::Done),
        };
        state = next;
        Ok(step)
    })
}

/// Drives `signal` low at once, then high on every rising edge of `clk`
/// seen while the active-high `rst` is low.
pub fn sync_pull_up_after_reset(signal: SignalId, clk: SignalId, rst: SignalId) -> Vec<ProcessBox> {
    let mut primed = false;
    let init = process_fn("sync-pull-up-init", move |ctx| {
        if !primed {
            primed = true;
            return Ok(Trigger::WriteOnly.into());
        }
        ctx.write(signal, Value::ZERO)?;
        Ok(Step::Done)
    });
    let on_edge = CallbackLoop::on_rising(clk, move || {
        let mut stage = 0u8;
        process_fn("sync-pull-up", move |ctx| {
            stage += 1;
            match stage {
                1 => Ok(Trigger::ReadOnly.into()),
                2 => {
                    if ctx.read_bool(rst)? {
                        Ok(Step::Done)
                    } else {
                        Ok(Trigger::WriteOnly.into())
                    }
                }
                _ => {
                    ctx.write(signal, Value::ONE)?;
                    Ok(Step::Done)
                }
            }
        })
    })
    .with_name("sync-pull-up-loop")
    .boxed();
    vec![init, on_edge]
}
