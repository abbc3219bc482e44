//! fOS Visibility
//!
//! Element visibility for fOS pages: how much of an element is inside its
//! viewport, whether styling hides it, whether the page itself is visible,
//! and monitors that sample this over time.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use fos_dom::ElementGeometry;
//! use fos_visibility::{EventLoop, EveryOptions, Page, Visibility};
//!
//! let page = Rc::new(Page::new(800.0, 600.0));
//! let document = page.document().unwrap();
//! let ad = page.append_element(document, "div").unwrap();
//! page.set_layout(ad, ElementGeometry::from_xywh(0.0, 100.0, 300.0, 250.0)).unwrap();
//!
//! let visibility = Rc::new(Visibility::new(page.clone(), page.page_visibility()).unwrap());
//! assert_eq!(visibility.percentage(ad), 1.0);
//!
//! let event_loop = Rc::new(EventLoop::new());
//! let monitor = visibility.create_monitor(ad, event_loop.clone());
//! monitor.every(EveryOptions::new(0.5, 1000, |_| println!("viewed"))).unwrap();
//! event_loop.advance(1100);
//! ```

mod config;
mod error;
mod evaluator;
mod event_loop;
mod events;
mod host;
mod monitor;
mod page;
mod page_visibility;
mod reading;

pub mod geometry;
pub mod style;

pub use config::VisibilityConfig;
pub use error::{Result, VisibilityError};
pub use evaluator::{compatible, Capabilities, Visibility};
pub use event_loop::{Clock, EventLoop, Scheduler, TimerId};
pub use events::{EmitterListenerId, EventEmitter, EventScope, EventSource, Subscription};
pub use geometry::{Rectangle, Viewport};
pub use host::{ElementHost, Size, StyleApi};
pub use monitor::{ConditionState, EveryOptions, Monitor, MonitorEvent, MonitorHandle, MonitorState, ThresholdCallback};
pub use page::Page;
pub use page_visibility::{DocumentVisibility, PageVisibility, PageVisibilityApi, VisibilityChangeHandler};
pub use reading::{VisibilityReading, VisibilityState};
