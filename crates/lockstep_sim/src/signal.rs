//! Kernel-side proxies for evaluator signals and their edge subscribers.

use std::collections::HashMap;

use lockstep_common::{SignalId, SimTime, Value};

use crate::error::SimError;
use crate::evaluator::SignalInfo;
use crate::trigger::Edge;

/// The kernel's view of one evaluator signal.
#[derive(Debug)]
pub struct SignalProxy<W> {
    info: SignalInfo,
    subscribers: Vec<(Edge, W)>,
}

impl<W> SignalProxy<W> {
    /// Hierarchical signal name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Bit width.
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Number of processes waiting on an edge of this signal.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Table of signal proxies indexed by [`SignalId`].
///
/// Edge subscriptions are one-shot: a subscriber is removed when a matching
/// change wakes it, and must subscribe again to see a later edge.
#[derive(Debug)]
pub struct SignalRegistry<W> {
    proxies: Vec<SignalProxy<W>>,
    by_name: HashMap<String, SignalId>,
}

impl<W> SignalRegistry<W> {
    /// Builds proxies for the signals an evaluator declares.
    pub fn from_infos(infos: &[SignalInfo]) -> Self {
        let mut by_name = HashMap::with_capacity(infos.len());
        let proxies = infos
            .iter()
            .enumerate()
            .map(|(i, info)| {
                by_name.insert(info.name.clone(), SignalId::from_raw(i as u32));
                SignalProxy {
                    info: info.clone(),
                    subscribers: Vec::new(),
                }
            })
            .collect();
        Self { proxies, by_name }
    }

    /// Looks up a signal handle by name.
    pub fn find(&self, name: &str) -> Option<SignalId> {
        self.by_name.get(name).copied()
    }

    /// Returns the proxy for `id`; `time` is reported if the handle is foreign.
    pub fn get(&self, id: SignalId, time: SimTime) -> Result<&SignalProxy<W>, SimError> {
        self.proxies.get(id.index()).ok_or(SimError::UnknownSignal {
            time,
            signal: id.as_raw(),
        })
    }

    /// Returns the name of `id`, or a placeholder for foreign handles.
    pub fn name_of(&self, id: SignalId) -> String {
        self.proxies
            .get(id.index())
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| format!("<signal {}>", id.as_raw()))
    }

    /// Returns the number of signals.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Returns `true` if the evaluator declared no signals.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Subscribes `waiter` to the next matching change of `id`.
    pub fn subscribe(
        &mut self,
        id: SignalId,
        edge: Edge,
        waiter: W,
        time: SimTime,
    ) -> Result<(), SimError> {
        let proxy = self
            .proxies
            .get_mut(id.index())
            .ok_or(SimError::UnknownSignal {
                time,
                signal: id.as_raw(),
            })?;
        proxy.subscribers.push((edge, waiter));
        Ok(())
    }

    /// Reports that `id` changed to `new`.
    ///
    /// Matching subscribers are moved into `woken` in subscription order;
    /// the rest stay registered.
    pub fn notify(&mut self, id: SignalId, new: Value, woken: &mut Vec<W>) {
        let Some(proxy) = self.proxies.get_mut(id.index()) else {
            return;
        };
        if proxy.subscribers.is_empty() {
            return;
        }
        let mut kept = Vec::with_capacity(proxy.subscribers.len());
        for (edge, waiter) in proxy.subscribers.drain(..) {
            if edge.matches(new) {
                woken.push(waiter);
            } else {
                kept.push((edge, waiter));
            }
        }
        proxy.subscribers = kept;
    }
}
