//! Reset drivers that release a line once after a delay.

use lockstep_common::{SignalId, SimTime, CLK_PERIOD};
use lockstep_sim::{Process, ProcessBox, SimContext, SimError, Step, Trigger};

use crate::base::Agent;

/// Default time before a pull driver flips its line: 0.6 of a clock period.
pub const DEFAULT_RESET_DELAY: SimTime = CLK_PERIOD * 6 / 10;

/// Drives a line to 0, then to 1 after a delay. Typically used for an
/// active-low reset.
#[derive(Clone, Copy, Debug)]
pub struct PullUp {
    signal: SignalId,
    init_delay: SimTime,
}

impl PullUp {
    /// Pull-up with [`DEFAULT_RESET_DELAY`].
    pub fn new(signal: SignalId) -> Self {
        Self::with_delay(signal, DEFAULT_RESET_DELAY)
    }

    /// Pull-up released after `init_delay` ticks.
    pub fn with_delay(signal: SignalId, init_delay: SimTime) -> Self {
        Self { signal, init_delay }
    }

    /// The driving process.
    pub fn driver(&self) -> ProcessBox {
        Box::new(Pull::new(self.signal, false, self.init_delay))
    }
}

impl Agent for PullUp {
    fn processes(&self) -> Vec<ProcessBox> {
        vec![self.driver()]
    }
}

/// Drives a line to 1, then to 0 after a delay. Typically used for an
/// active-high reset.
#[derive(Clone, Copy, Debug)]
pub struct PullDown {
    signal: SignalId,
    init_delay: SimTime,
}

impl PullDown {
    /// Pull-down with [`DEFAULT_RESET_DELAY`].
    pub fn new(signal: SignalId) -> Self {
        Self::with_delay(signal, DEFAULT_RESET_DELAY)
    }

    /// Pull-down released after `init_delay` ticks.
    pub fn with_delay(signal: SignalId, init_delay: SimTime) -> Self {
        Self { signal, init_delay }
    }

    /// The driving process.
    pub fn driver(&self) -> ProcessBox {
        Box::new(Pull::new(self.signal, true, self.init_delay))
    }
}

impl Agent for PullDown {
    fn processes(&self) -> Vec<ProcessBox> {
        vec![self.driver()]
    }
}

struct Pull {
    signal: SignalId,
    initial: bool,
    delay: SimTime,
    step: u8,
}

impl Pull {
    fn new(signal: SignalId, initial: bool, delay: SimTime) -> Self {
        Self {
            signal,
            initial,
            delay,
            step: 0,
        }
    }
}

impl Process for Pull {
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, SimError> {
        self.step += 1;
        match self.step {
            1 => Ok(Trigger::WriteOnly.into()),
            2 => {
                ctx.write(self.signal, self.initial)?;
                Ok(Trigger::Timer(self.delay).into())
            }
            3 => Ok(Trigger::WriteOnly.into()),
            4 => {
                ctx.write(self.signal, !self.initial)?;
                Ok(Step::Done)
            }
            _ => Ok(Step::Done),
        }
    }

    fn name(&self) -> &str {
        if self.initial {
            "pull-down"
        } else {
            "pull-up"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Wires;
    use lockstep_sim::{process_fn, CallbackLoop, HdlSimulator};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record_changes(signal: SignalId, log: Rc<RefCell<Vec<(SimTime, bool)>>>) -> ProcessBox {
        CallbackLoop::on_change(signal, move || {
            let log = log.clone();
            let mut started = false;
            process_fn("record", move |ctx| {
                if !started {
                    started = true;
                    return Ok(Trigger::ReadOnly.into());
                }
                log.borrow_mut().push((ctx.now(), ctx.read_bool(signal)?));
                Ok(Step::Done)
            })
        })
        .boxed()
    }

    #[test]
    fn default_delay_is_six_tenths_of_a_period() {
        assert_eq!(DEFAULT_RESET_DELAY, 6_000);
    }

    #[test]
    fn pull_up_releases_after_delay() {
        let mut sim = HdlSimulator::new(Wires::undefined(&[("rst_n", 1)]));
        let rst_n = sim.signal("rst_n").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut procs = vec![record_changes(rst_n, log.clone())];
        procs.extend(PullUp::with_delay(rst_n, 10_000).processes());
        sim.run(20_000, procs).unwrap();
        assert_eq!(*log.borrow(), vec![(0, false), (10_000, true)]);
    }

    #[test]
    fn pull_down_releases_after_default_delay() {
        let mut sim = HdlSimulator::new(Wires::undefined(&[("rst", 1)]));
        let rst = sim.signal("rst").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let procs = vec![record_changes(rst, log.clone()), PullDown::new(rst).driver()];
        sim.run(10_000, procs).unwrap();
        assert_eq!(*log.borrow(), vec![(0, true), (6_000, false)]);
    }
}
