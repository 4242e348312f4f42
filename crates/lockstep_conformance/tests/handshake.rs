//! Valid/ready scenarios over a pass-through wire: a driver agent on the
//! input side, a monitor agent on the output side, an active-low reset
//! released after one clock period.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use lockstep_agents::{Agent, AgentRole, DataLine, HandshakeAgent, PullUp, ResetPolarity, Shared};
use lockstep_common::{SignalId, SimTime, Value, CLK_PERIOD};
use lockstep_conformance::{writes_to, HandshakedWireModel, Recording, WriteLog};
use lockstep_sim::{oscillate, process_fn, HdlSimulator, ProcessBox, SimError, Step, Trigger};

const UNTIL: SimTime = 205_000;

type Handshake = Shared<HandshakeAgent<DataLine>>;

struct Bench {
    sim: HdlSimulator,
    clk: SignalId,
    rst_n: SignalId,
    din: DataLine,
    dout: DataLine,
    writes: WriteLog,
}

fn bench() -> Bench {
    let (model, writes) = Recording::new(HandshakedWireModel::new());
    let sim = HdlSimulator::new(Box::new(model));
    let sig = |name: &str| sim.signal(name).unwrap();
    let clk = sig("clk");
    let rst_n = sig("rst_n");
    let din = DataLine {
        valid: sig("dataIn_vld"),
        ready: sig("dataIn_rd"),
        data: sig("dataIn_data"),
    };
    let dout = DataLine {
        valid: sig("dataOut_vld"),
        ready: sig("dataOut_rd"),
        data: sig("dataOut_data"),
    };
    Bench {
        sim,
        clk,
        rst_n,
        din,
        dout,
        writes,
    }
}

/// Driver on `dataIn`, monitor on `dataOut`.
fn agents(b: &Bench) -> (Handshake, Handshake) {
    let driver = HandshakeAgent::new(
        b.din,
        b.clk,
        b.rst_n,
        ResetPolarity::ActiveLow,
        AgentRole::Driver,
    )
    .shared();
    let monitor = HandshakeAgent::new(
        b.dout,
        b.clk,
        b.rst_n,
        ResetPolarity::ActiveLow,
        AgentRole::Monitor,
    )
    .shared();
    (driver, monitor)
}

fn testbench(b: &Bench, driver: &Handshake, monitor: &Handshake) -> Vec<ProcessBox> {
    let mut procs = vec![
        oscillate(b.clk, CLK_PERIOD, 0),
        PullUp::with_delay(b.rst_n, CLK_PERIOD).driver(),
    ];
    procs.extend(driver.processes());
    procs.extend(monitor.processes());
    procs
}

fn items(values: &[u8]) -> VecDeque<Value> {
    values.iter().copied().map(Value::from).collect()
}

/// Enables or disables `agent` in the WriteOnly phase of the current instant.
fn set_enable_now(agent: &Handshake, enabled: bool) -> ProcessBox {
    let agent = Rc::clone(agent);
    let mut primed = false;
    process_fn("set-enable", move |ctx| {
        if !primed {
            primed = true;
            return Ok(Trigger::WriteOnly.into());
        }
        agent.borrow_mut().set_enable(enabled, ctx)?;
        Ok(Step::Done)
    })
}

/// Enables or disables `agent` `delay` from now, in a WriteOnly round that
/// starts after both agents have sampled the edge at that instant.
fn set_enable_after_sampling(agent: &Handshake, enabled: bool, delay: SimTime) -> ProcessBox {
    let agent = Rc::clone(agent);
    let mut stage = 0u8;
    process_fn("set-enable-after-sampling", move |ctx| {
        stage += 1;
        match stage {
            1 => Ok(Trigger::Timer(delay).into()),
            2 | 3 => Ok(Trigger::ReadOnly.into()),
            4 => Ok(Trigger::WriteOnly.into()),
            _ => {
                agent.borrow_mut().set_enable(enabled, ctx)?;
                Ok(Step::Done)
            }
        }
    })
}

#[test]
fn items_pass_through_in_order() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3, 4, 5]);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(UNTIL, procs).unwrap();
    assert!(driver.borrow().data.is_empty());
    assert!(driver.borrow().in_flight().is_none());
    assert_eq!(monitor.borrow().data, items(&[1, 2, 3, 4, 5]));
}

#[test]
fn empty_queue_transfers_nothing() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(UNTIL, procs).unwrap();
    assert!(driver.borrow().data.is_empty());
    assert!(monitor.borrow().data.is_empty());
    assert!(writes_to(&b.writes, b.din.valid).is_empty());
    assert_eq!(writes_to(&b.writes, b.dout.ready), vec![Value::ONE]);
}

#[test]
fn agent_lines_are_never_rewritten_with_the_same_value() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3, 4, 5]);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(UNTIL, procs).unwrap();
    for line in [b.din.valid, b.din.data, b.dout.ready] {
        let seq = writes_to(&b.writes, line);
        assert!(
            seq.windows(2).all(|w| w[0] != w[1]),
            "repeated write on {line:?}: {seq:?}"
        );
    }
    assert_eq!(
        writes_to(&b.writes, b.din.valid),
        vec![Value::ONE, Value::ZERO]
    );
    let mut data: Vec<Value> = items(&[1, 2, 3, 4, 5]).into();
    data.push(Value::Undefined);
    assert_eq!(writes_to(&b.writes, b.din.data), data);
}

#[test]
fn callbacks_see_every_transfer_once() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    let done = Rc::new(RefCell::new(Vec::new()));
    {
        let mut d = driver.borrow_mut();
        d.data = items(&[9, 8, 7]);
        let done = Rc::clone(&done);
        d.callbacks.on_done = Some(Box::new(move |item: &Value| done.borrow_mut().push(*item)));
    }
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(UNTIL, procs).unwrap();
    assert_eq!(*done.borrow(), Vec::from(items(&[9, 8, 7])));
    assert_eq!(monitor.borrow().data, items(&[9, 8, 7]));
}

#[test]
fn disabling_driver_keeps_in_flight_item() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3, 4, 5]);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(20_000, procs).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1]));

    b.sim.run(30_000, vec![set_enable_now(&driver, false)]).unwrap();
    assert!(!driver.borrow().is_enabled());
    assert_eq!(driver.borrow().in_flight(), Some(&Value::from(2u8)));
    assert_eq!(driver.borrow().data, items(&[3, 4, 5]));
    assert_eq!(monitor.borrow().data, items(&[1]));
    assert_eq!(
        writes_to(&b.writes, b.din.valid),
        vec![Value::ONE, Value::ZERO]
    );

    // Already low: disabling again writes nothing.
    b.sim.run(40_000, vec![set_enable_now(&driver, false)]).unwrap();
    assert_eq!(
        writes_to(&b.writes, b.din.valid),
        vec![Value::ONE, Value::ZERO]
    );

    b.sim.run(UNTIL, vec![set_enable_now(&driver, true)]).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1, 2, 3, 4, 5]));
    assert!(driver.borrow().in_flight().is_none());
    assert_eq!(
        writes_to(&b.writes, b.din.valid),
        vec![Value::ONE, Value::ZERO, Value::ONE, Value::ZERO]
    );
}

#[test]
fn driver_disabled_after_sampling_an_edge_keeps_its_item() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3]);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(20_000, procs).unwrap();

    // Ready is high at 25 ns, but valid drops before the handshake settles.
    b.sim
        .run(30_000, vec![set_enable_after_sampling(&driver, false, 5_000)])
        .unwrap();
    assert_eq!(driver.borrow().in_flight(), Some(&Value::from(2u8)));
    assert_eq!(driver.borrow().data, items(&[3]));
    assert_eq!(monitor.borrow().data, items(&[1]));

    b.sim.run(UNTIL, vec![set_enable_now(&driver, true)]).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1, 2, 3]));
    assert!(driver.borrow().in_flight().is_none());
}

#[test]
fn monitor_disabled_after_sampling_an_edge_takes_nothing() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3]);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(20_000, procs).unwrap();

    b.sim
        .run(30_000, vec![set_enable_after_sampling(&monitor, false, 5_000)])
        .unwrap();
    assert_eq!(monitor.borrow().data, items(&[1]));
    assert_eq!(driver.borrow().in_flight(), Some(&Value::from(2u8)));
    assert_eq!(driver.borrow().data, items(&[3]));

    b.sim.run(UNTIL, vec![set_enable_now(&monitor, true)]).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1, 2, 3]));
    assert!(driver.borrow().data.is_empty());
    assert!(driver.borrow().in_flight().is_none());
}

#[test]
fn driver_created_disabled_starts_on_enable() {
    let mut b = bench();
    let monitor = HandshakeAgent::new(
        b.dout,
        b.clk,
        b.rst_n,
        ResetPolarity::ActiveLow,
        AgentRole::Monitor,
    )
    .shared();
    let mut driver = HandshakeAgent::new(
        b.din,
        b.clk,
        b.rst_n,
        ResetPolarity::ActiveLow,
        AgentRole::Driver,
    )
    .with_enabled(false);
    driver.data = items(&[1, 2]);
    let driver = driver.shared();
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(40_000, procs).unwrap();
    assert!(monitor.borrow().data.is_empty());
    assert!(writes_to(&b.writes, b.din.valid).is_empty());
    assert!(writes_to(&b.writes, b.din.data).is_empty());

    b.sim.run(UNTIL, vec![set_enable_now(&driver, true)]).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1, 2]));
    assert!(driver.borrow().data.is_empty());
}

#[test]
fn disabling_monitor_stalls_the_driver() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3, 4, 5]);
    let procs = testbench(&b, &driver, &monitor);
    b.sim.run(20_000, procs).unwrap();
    b.sim.run(40_000, vec![set_enable_now(&monitor, false)]).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1]));
    assert_eq!(driver.borrow().in_flight(), Some(&Value::from(2u8)));
    assert_eq!(
        writes_to(&b.writes, b.dout.ready),
        vec![Value::ONE, Value::ZERO]
    );

    b.sim.run(UNTIL, vec![set_enable_now(&monitor, true)]).unwrap();
    assert_eq!(monitor.borrow().data, items(&[1, 2, 3, 4, 5]));
    assert!(driver.borrow().data.is_empty());
}

#[test]
fn foreign_write_to_valid_is_protocol_violation() {
    let mut b = bench();
    let (driver, monitor) = agents(&b);
    driver.borrow_mut().data = items(&[1, 2, 3]);
    let mut procs = testbench(&b, &driver, &monitor);
    let vld = b.din.valid;
    let mut stage = 0u8;
    // Pulls valid low between the driver's ticks at 15 ns and 25 ns.
    procs.push(process_fn("saboteur", move |ctx| {
        stage += 1;
        match stage {
            1 => Ok(Trigger::Timer(20_000).into()),
            2 => Ok(Trigger::WriteOnly.into()),
            _ => {
                ctx.write(vld, false)?;
                Ok(Step::Done)
            }
        }
    }));
    let err = b.sim.run(UNTIL, procs).unwrap_err();
    assert!(matches!(
        err.root(),
        SimError::ProtocolViolation {
            time: 25_000,
            expected: true,
            observed: false,
            signal,
        } if signal == "dataIn_vld"
    ));
}
