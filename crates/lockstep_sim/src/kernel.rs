//! The delta-cycle scheduler.
//!
//! [`HdlSimulator`] owns the circuit evaluator, the event calendar and the
//! phase barriers. It pops calendar entries in `(time, priority)` order,
//! resumes processes, and fires phase barriers, driving the evaluator
//! through its state machine so that testbench writes are always resolved
//! by combinational logic before anything samples the circuit.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use lockstep_common::{SignalId, SimTime};
use lockstep_config::BenchConfig;

use crate::calendar::Calendar;
use crate::context::SimContext;
use crate::error::SimError;
use crate::evaluator::{EvalStatus, Evaluator};
use crate::phase::{AccessMode, Phase, PhaseBarriers, Priority};
use crate::process::{Process, ProcessBox, Step};
use crate::signal::SignalRegistry;
use crate::trigger::Trigger;

/// Default cap on WriteOnly rounds at a single instant.
pub const DEFAULT_MAX_DELTA_ROUNDS: u32 = 10_000;

/// What a calendar entry does when it is popped.
enum Payload {
    /// Resume a process.
    Process(ProcessBox),
    /// Fire the pending barrier of a phase.
    Phase(Phase),
    /// End the current run.
    Stop,
}

/// Statistics of a completed [`HdlSimulator::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Simulation time when the run stopped.
    pub final_time: SimTime,
    /// WriteOnly rounds fired since the simulator was created.
    pub delta_rounds: u64,
    /// Process resumptions since the simulator was created.
    pub resumed: u64,
}

/// Co-simulation kernel coordinating testbench processes with a circuit
/// evaluator.
///
/// Construct with [`HdlSimulator::new`] or [`HdlSimulator::from_config`],
/// resolve signal handles with [`signal`](HdlSimulator::signal), then call
/// [`run`](HdlSimulator::run) with the processes to start.
pub struct HdlSimulator {
    /// The external circuit evaluator.
    evaluator: Box<dyn Evaluator>,
    /// Proxies and edge subscribers for the evaluator's signals.
    signals: SignalRegistry<ProcessBox>,
    /// Pending processes, phase barriers and the stop sentinel.
    calendar: Calendar<Payload>,
    /// Barrier waiters for the current instant.
    barriers: PhaseBarriers<ProcessBox>,
    /// Edge subscribers woken since the last drain.
    woken: Vec<ProcessBox>,
    /// Current simulation time.
    now: SimTime,
    /// Whether processes may currently write or read.
    mode: AccessMode,
    /// A write happened that no evaluation has absorbed yet.
    dirty: bool,
    /// WriteOnly rounds at the current instant.
    rounds: u32,
    /// Limit on `rounds`.
    max_delta_rounds: u32,
    /// Total WriteOnly rounds.
    total_rounds: u64,
    /// Total process resumptions.
    resumed: u64,
}

impl HdlSimulator {
    /// Creates a simulator at time 0 in write-only mode.
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        let signals = SignalRegistry::from_infos(evaluator.signals());
        Self {
            evaluator,
            signals,
            calendar: Calendar::new(),
            barriers: PhaseBarriers::new(),
            woken: Vec::new(),
            now: 0,
            mode: AccessMode::WriteOnly,
            dirty: false,
            rounds: 0,
            max_delta_rounds: DEFAULT_MAX_DELTA_ROUNDS,
            total_rounds: 0,
            resumed: 0,
        }
    }

    /// Creates a simulator with the kernel limits and trace output of a
    /// testbench configuration.
    pub fn from_config(
        mut evaluator: Box<dyn Evaluator>,
        config: &BenchConfig,
    ) -> Result<Self, SimError> {
        if let Some(trace) = &config.trace {
            evaluator.set_trace_file(&trace.path, trace.depth)?;
        }
        let mut sim = Self::new(evaluator);
        sim.set_max_delta_rounds(config.kernel.max_delta_rounds);
        Ok(sim)
    }

    /// Sets the maximum number of WriteOnly rounds at a single instant.
    pub fn set_max_delta_rounds(&mut self, max: u32) {
        self.max_delta_rounds = max;
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Current access mode.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Looks up a signal handle by name.
    pub fn signal(&self, name: &str) -> Option<SignalId> {
        self.signals.find(name)
    }

    /// Returns the number of signals the evaluator exposes.
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Schedules a process at the current time with WriteOnly priority.
    pub fn add_process(&mut self, process: ProcessBox) {
        self.calendar
            .push(self.now, Priority::WriteOnly, Payload::Process(process));
    }

    /// Runs the simulation until the absolute time `until`.
    ///
    /// `extra` processes are scheduled at the current time first. Entries due
    /// at `until` itself are left on the calendar, so a later call continues
    /// from where this one stopped.
    pub fn run(&mut self, until: SimTime, extra: Vec<ProcessBox>) -> Result<RunSummary, SimError> {
        for process in extra {
            self.add_process(process);
        }
        if until < self.now {
            return Err(SimError::SchedulingInvariant {
                time: self.now,
                reason: format!("run deadline {until} is in the past"),
            });
        }
        if until == self.now {
            return Ok(self.summary());
        }
        self.calendar.push(until, Priority::Urgent, Payload::Stop);
        debug!(from = self.now, until, "run started");

        loop {
            let entry = self
                .calendar
                .pop()
                .ok_or_else(|| SimError::SchedulingInvariant {
                    time: self.now,
                    reason: "calendar exhausted before the run deadline".into(),
                })?;
            if entry.time < self.now {
                return Err(SimError::SchedulingInvariant {
                    time: self.now,
                    reason: format!("entry scheduled at {} popped after time advanced", entry.time),
                });
            }
            if entry.time > self.now {
                self.advance(entry.time);
            }
            match entry.payload {
                Payload::Stop => {
                    let summary = self.summary();
                    debug!(
                        time = self.now,
                        delta_rounds = summary.delta_rounds,
                        resumed = summary.resumed,
                        "run finished"
                    );
                    return Ok(summary);
                }
                Payload::Process(process) => self.run_process(process, entry.priority)?,
                Payload::Phase(phase) => self.fire(phase)?,
            }
            if self.dirty && self.mode == AccessMode::WriteOnly {
                self.spot(Phase::WriteOnly);
            }
        }
    }

    /// Releases evaluator resources (flushes trace output).
    pub fn finalize(&mut self) -> Result<(), SimError> {
        self.evaluator.finalize()
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            final_time: self.now,
            delta_rounds: self.total_rounds,
            resumed: self.resumed,
        }
    }

    fn advance(&mut self, time: SimTime) {
        debug!(from = self.now, to = time, "time advanced");
        self.now = time;
        self.rounds = 0;
        self.barriers.set_settled(false);
    }

    /// Resumes `process` until it suspends or finishes.
    fn run_process(&mut self, mut process: ProcessBox, priority: Priority) -> Result<(), SimError> {
        loop {
            self.resumed += 1;
            trace!(time = self.now, process = process.name(), ?priority, "resume");
            let mut ctx = SimContext::new(
                self.now,
                self.mode,
                &mut *self.evaluator,
                &mut self.signals,
                &mut self.woken,
            );
            let result = process.resume(&mut ctx);
            let wrote = ctx.wrote();
            self.dirty |= wrote;
            let step = result.map_err(|e| self.process_error(&*process, e))?;

            match step {
                Step::Wait(Trigger::Timer(0)) => continue,
                Step::Wait(Trigger::Timer(delay)) => {
                    let at = self.now.checked_add(delay).ok_or_else(|| {
                        SimError::SchedulingInvariant {
                            time: self.now,
                            reason: format!("timer of {delay} overflows simulation time"),
                        }
                    })?;
                    self.calendar
                        .push(at, Priority::WriteOnly, Payload::Process(process));
                    return Ok(());
                }
                Step::Wait(Trigger::Edge(signal, edge)) => {
                    if let Err(e) = self.signals.get(signal, self.now) {
                        return Err(self.process_error(&*process, e));
                    }
                    return self.signals.subscribe(signal, edge, process, self.now);
                }
                Step::Wait(trigger) => {
                    let Some(phase) = trigger.phase() else {
                        return Err(SimError::SchedulingInvariant {
                            time: self.now,
                            reason: format!("unhandled trigger {trigger:?}"),
                        });
                    };
                    if let Err(e) = self.barriers.check_request(phase, self.now) {
                        return Err(self.process_error(&*process, e));
                    }
                    if phase == Phase::AllStable && !self.barriers.is_settled() {
                        self.spot(Phase::CombStable);
                    }
                    if self.barriers.join(phase, process) {
                        self.calendar
                            .push(self.now, phase.priority(), Payload::Phase(phase));
                    }
                    return Ok(());
                }
                Step::Spawn(child) => {
                    trace!(time = self.now, parent = process.name(), child = child.name(), "spawn");
                    self.calendar
                        .push(self.now, priority, Payload::Process(child));
                }
                Step::Done => return Ok(()),
            }
        }
    }

    fn process_error(&self, process: &dyn Process, source: SimError) -> SimError {
        SimError::Process {
            process: process.name().to_string(),
            time: self.now,
            source: Box::new(source),
        }
    }

    /// Schedules the barrier for `phase` at the current instant unless one is
    /// already pending.
    fn spot(&mut self, phase: Phase) {
        if self.barriers.spot(phase) {
            self.calendar
                .push(self.now, phase.priority(), Payload::Phase(phase));
        }
    }

    fn fire(&mut self, phase: Phase) -> Result<(), SimError> {
        let waiters = self.barriers.fire(phase, self.now)?;
        debug!(time = self.now, %phase, waiters = waiters.len(), "phase fired");
        match phase {
            Phase::WriteOnly => self.fire_write_only(waiters),
            Phase::ReadOnly => self.fire_read_only(waiters),
            Phase::CombStable => self.fire_comb_stable(waiters),
            Phase::AllStable => self.fire_all_stable(waiters),
        }
    }

    fn resume_all(&mut self, waiters: Vec<ProcessBox>, priority: Priority) -> Result<(), SimError> {
        for process in waiters {
            self.run_process(process, priority)?;
        }
        Ok(())
    }

    fn fire_write_only(&mut self, waiters: Vec<ProcessBox>) -> Result<(), SimError> {
        self.rounds += 1;
        self.total_rounds += 1;
        if self.rounds > self.max_delta_rounds {
            return Err(SimError::DeltaRoundLimit {
                time: self.now,
                max_rounds: self.max_delta_rounds,
            });
        }
        if self.mode == AccessMode::ReadOnly {
            debug!(time = self.now, round = self.rounds, "late write, re-evaluating");
            self.evaluator.reset_eval();
            self.mode = AccessMode::WriteOnly;
        }
        self.resume_all(waiters, Priority::WriteOnly)?;
        self.comb_update(Priority::WriteOnly)?;
        self.spot(Phase::ReadOnly);
        Ok(())
    }

    fn fire_read_only(&mut self, waiters: Vec<ProcessBox>) -> Result<(), SimError> {
        if self.mode == AccessMode::WriteOnly {
            self.comb_update(Priority::ReadOnly)?;
        }
        self.resume_all(waiters, Priority::ReadOnly)?;
        if self.barriers.is_pending(Phase::WriteOnly) {
            debug!(time = self.now, "write requested after read, re-running delta round");
            self.evaluator.reset_eval();
            self.mode = AccessMode::WriteOnly;
        }
        self.spot(Phase::CombStable);
        Ok(())
    }

    fn fire_comb_stable(&mut self, waiters: Vec<ProcessBox>) -> Result<(), SimError> {
        if self.mode == AccessMode::WriteOnly {
            self.comb_update(Priority::CombStable)?;
        }
        self.barriers.set_settled(true);
        self.resume_all(waiters, Priority::CombStable)?;

        let mut steps = 0u32;
        loop {
            let status = self.evaluator.eval()?;
            self.collect_circuit_events();
            self.drain_woken(Priority::AllStable)?;
            if status == EvalStatus::EndOfStep {
                break;
            }
            steps += 1;
            if steps > self.max_delta_rounds {
                return Err(SimError::DeltaRoundLimit {
                    time: self.now,
                    max_rounds: self.max_delta_rounds,
                });
            }
        }
        self.spot(Phase::AllStable);
        Ok(())
    }

    fn fire_all_stable(&mut self, waiters: Vec<ProcessBox>) -> Result<(), SimError> {
        self.barriers.set_settled(false);
        self.resume_all(waiters, Priority::AllStable)?;
        self.evaluator.set_write_only();
        self.mode = AccessMode::WriteOnly;
        Ok(())
    }

    /// Incremental evaluation of the latest writes.
    fn comb_update(&mut self, priority: Priority) -> Result<(), SimError> {
        let status = self.evaluator.eval()?;
        if status != EvalStatus::CombUpdateDone {
            return Err(SimError::SchedulingInvariant {
                time: self.now,
                reason: format!("evaluator returned {status:?} where CombUpdateDone was expected"),
            });
        }
        self.mode = AccessMode::ReadOnly;
        self.dirty = false;
        self.collect_circuit_events();
        self.drain_woken(priority)
    }

    /// Propagates signal changes made by the circuit to edge subscribers.
    fn collect_circuit_events(&mut self) {
        for signal in self.evaluator.drain_events() {
            let value = self.evaluator.read(signal);
            trace!(time = self.now, signal = signal.as_raw(), %value, "circuit event");
            self.signals.notify(signal, value, &mut self.woken);
        }
    }

    /// Resumes woken edge subscribers until none are left.
    fn drain_woken(&mut self, priority: Priority) -> Result<(), SimError> {
        while !self.woken.is_empty() {
            let batch = std::mem::take(&mut self.woken);
            self.resume_all(batch, priority)?;
        }
        Ok(())
    }
}
