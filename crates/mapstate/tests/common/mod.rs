#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use foundation::{LatLng, LatLngBounds};
use mapstate::{HeadlessMap, Host, MapWidget, ParameterError, ViewOptions};
use runtime::{InteractivityFlag, LocalFlag};
use serde_json::Value;

/// What the initial-view parameter lookup answers.
#[derive(Debug, Clone)]
pub enum Answer {
    Value(Value),
    Reject(String),
    /// Stays pending until [`Gate::open`] is called.
    Gated(Value),
}

#[derive(Debug, Default, Clone)]
pub struct Gate(Rc<Cell<bool>>);

impl Gate {
    pub fn open(&self) {
        self.0.set(true);
    }
}

struct GateFuture {
    gate: Gate,
}

impl Future for GateFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.gate.0.get() {
            Poll::Ready(())
        } else {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub struct FakeHost {
    pub flag: Rc<LocalFlag>,
    pub answer: RefCell<Answer>,
    pub gate: Gate,
    pub links: Cell<u32>,
    pub requested: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new(flag: Rc<LocalFlag>, answer: Answer) -> Self {
        Self {
            flag,
            answer: RefCell::new(answer),
            gate: Gate::default(),
            links: Cell::new(0),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl InteractivityFlag for FakeHost {
    fn set_non_interactive(&self, value: bool) {
        self.flag.set_non_interactive(value)
    }

    fn is_interactive(&self) -> bool {
        self.flag.is_interactive()
    }
}

impl Host for FakeHost {
    async fn get_parameter(&self, name: &str) -> Result<Value, ParameterError> {
        self.requested.borrow_mut().push(name.to_string());
        let answer = self.answer.borrow().clone();
        match answer {
            Answer::Value(v) => Ok(v),
            Answer::Reject(msg) => Err(ParameterError::Rejected(msg)),
            Answer::Gated(v) => {
                GateFuture {
                    gate: self.gate.clone(),
                }
                .await;
                Ok(v)
            }
        }
    }

    fn update_link(&self) {
        self.links.set(self.links.get() + 1);
    }
}

/// Headless map that also notes whether the flag was raised for each command.
pub struct FlagRecordingMap {
    pub inner: HeadlessMap,
    pub flag: Rc<LocalFlag>,
    pub interactive_during: RefCell<Vec<bool>>,
}

impl FlagRecordingMap {
    pub fn new(inner: HeadlessMap, flag: Rc<LocalFlag>) -> Self {
        Self {
            inner,
            flag,
            interactive_during: RefCell::new(Vec::new()),
        }
    }

    fn record_flag(&self) {
        self.interactive_during
            .borrow_mut()
            .push(self.flag.is_interactive());
    }
}

impl MapWidget for FlagRecordingMap {
    fn set_view(&self, center: LatLng, zoom: f64, options: &ViewOptions) {
        self.record_flag();
        self.inner.set_view(center, zoom, options)
    }

    fn fly_to(&self, center: LatLng, zoom: f64, options: &ViewOptions) {
        self.record_flag();
        self.inner.fly_to(center, zoom, options)
    }

    fn fit_bounds(&self, bounds: LatLngBounds, options: &ViewOptions) {
        self.record_flag();
        self.inner.fit_bounds(bounds, options)
    }

    fn zoom(&self) -> Option<f64> {
        self.inner.zoom()
    }

    fn center(&self) -> LatLng {
        self.inner.center()
    }

    fn set_attribution_prefix(&self, html: &str) {
        self.inner.set_attribution_prefix(html)
    }
}
