//! Background scheduler for the two sync loops.
//!
//! Runs the order queue worker on a seconds-scale timer and the menu sync
//! on a minutes-scale timer. Each loop owns an atomic in-flight guard: a
//! tick that lands while the previous run is still going is skipped, and
//! manual triggers are rejected for the same reason.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use posbridge_connect::{MenuSyncServiceTrait, OrderSyncServiceTrait};
use posbridge_core::errors::Result;
use posbridge_core::menu::MenuSyncSummary;
use posbridge_core::orders::OrderSyncRunSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub running: bool,
    pub interval_secs: u64,
    pub processing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub order_sync: TaskStatus,
    pub menu_sync: TaskStatus,
}

pub struct Scheduler {
    order_sync: Arc<dyn OrderSyncServiceTrait>,
    menu_sync: Arc<dyn MenuSyncServiceTrait>,
    order_interval_secs: u64,
    menu_interval_secs: u64,
    order_batch_size: i64,
    order_processing: AtomicBool,
    menu_processing: AtomicBool,
    started: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        order_sync: Arc<dyn OrderSyncServiceTrait>,
        menu_sync: Arc<dyn MenuSyncServiceTrait>,
        order_interval_secs: u64,
        menu_interval_mins: u64,
        order_batch_size: i64,
    ) -> Self {
        Self {
            order_sync,
            menu_sync,
            order_interval_secs: order_interval_secs.max(1),
            menu_interval_secs: menu_interval_mins.max(1) * 60,
            order_batch_size,
            order_processing: AtomicBool::new(false),
            menu_processing: AtomicBool::new(false),
            started: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawns both timer loops. Idempotent; a second call is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(
            "Scheduler started (order sync every {}s, menu sync every {}s)",
            self.order_interval_secs, self.menu_interval_secs
        );

        let order = self.clone();
        let order_handle = tokio::spawn(async move {
            let mut tick = interval(Duration::from_secs(order.order_interval_secs));
            loop {
                tick.tick().await;
                match order.run_order_tick().await {
                    None => debug!("Order sync tick skipped; previous run still in flight"),
                    Some(Err(e)) => warn!("Order sync tick failed: {}", e),
                    Some(Ok(summary)) if summary.claimed > 0 => {
                        debug!("Order sync tick processed {} entries", summary.claimed)
                    }
                    Some(Ok(_)) => {}
                }
            }
        });

        let menu = self.clone();
        let menu_handle = tokio::spawn(async move {
            let mut tick = interval(Duration::from_secs(menu.menu_interval_secs));
            loop {
                tick.tick().await;
                match menu.run_menu_tick().await {
                    None => debug!("Menu sync tick skipped; previous run still in flight"),
                    Some(Err(e)) => warn!("Menu sync tick failed: {}", e),
                    Some(Ok(_)) => {}
                }
            }
        });

        let mut handles = self.handles.lock().unwrap();
        handles.push(order_handle);
        handles.push(menu_handle);
    }

    /// Stops both timer loops. In-flight guards are left as-is; a run that
    /// was mid-tick finishes or dies with the task.
    pub fn shutdown(&self) {
        if !self.started.swap(false, Ordering::AcqRel) {
            return;
        }
        for handle in self.handles.lock().unwrap().drain(..) {
            handle.abort();
        }
        info!("Scheduler stopped");
    }

    /// One order sync pass, or `None` when a pass is already in flight.
    /// Manual triggers and timer ticks share this path.
    pub async fn run_order_tick(&self) -> Option<Result<OrderSyncRunSummary>> {
        if self
            .order_processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let result = self.order_sync.run_once(self.order_batch_size).await;
        self.order_processing.store(false, Ordering::Release);
        Some(result)
    }

    /// One menu sync pass over all due configurations, or `None` when a
    /// pass is already in flight.
    pub async fn run_menu_tick(&self) -> Option<Result<MenuSyncSummary>> {
        if self
            .menu_processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let result = self.menu_sync.sync_all_menus().await;
        self.menu_processing.store(false, Ordering::Release);
        Some(result)
    }

    pub fn status(&self) -> SchedulerStatus {
        let running = self.started.load(Ordering::Acquire);
        SchedulerStatus {
            order_sync: TaskStatus {
                running,
                interval_secs: self.order_interval_secs,
                processing: self.order_processing.load(Ordering::Acquire),
            },
            menu_sync: TaskStatus {
                running,
                interval_secs: self.menu_interval_secs,
                processing: self.menu_processing.load(Ordering::Acquire),
            },
        }
    }
}
