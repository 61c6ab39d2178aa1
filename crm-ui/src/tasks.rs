//! Bridge between the egui thread and async service calls.
//!
//! Service calls run on a tokio runtime; completions come back over a
//! channel and are drained once per frame. Page and count responses carry
//! the sequence number issued at spawn time, and the bridge only admits
//! the newest one, so a slow page 2 response can never overwrite page 3.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use crm_core::{
    Customer, EstimatePage, Fleet, NewCustomer, NewFleet, NewReferralSource, NewTag,
    ReferralSource, RequestSequencer, TableQuery, Tag, WorkflowCounts, WorkflowService,
    WorkflowStage,
};
use tokio::runtime::Handle;

/// A completed background call, delivered to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    PageLoaded { seq: u64, page: EstimatePage },
    PageFailed { seq: u64, error: String },
    CountsLoaded { seq: u64, counts: WorkflowCounts },
    CountsFailed { seq: u64, error: String },
    StatusUpdated { id: i64, stage: WorkflowStage, result: Result<(), String> },
    CustomerSaved(Result<Customer, String>),
    TagCreated(Result<Tag, String>),
    ReferralSourceCreated(Result<ReferralSource, String>),
    FleetCreated(Result<Fleet, String>),
}

pub struct TaskBridge {
    runtime: Handle,
    service: Arc<dyn WorkflowService>,
    tx: Sender<UiEvent>,
    rx: Receiver<UiEvent>,
    pages: RequestSequencer,
    counts: RequestSequencer,
    ctx: egui::Context,
}

impl TaskBridge {
    pub fn new(runtime: Handle, service: Arc<dyn WorkflowService>, ctx: egui::Context) -> Self {
        let (tx, rx) = channel();
        Self {
            runtime,
            service,
            tx,
            rx,
            pages: RequestSequencer::default(),
            counts: RequestSequencer::default(),
            ctx,
        }
    }

    /// Events that completed since the last frame.
    pub fn drain(&self) -> Vec<UiEvent> {
        self.rx.try_iter().collect()
    }

    /// True when `seq` is the newest page request. Marks it accepted.
    pub fn accept_page(&mut self, seq: u64) -> bool {
        self.pages.accept(seq)
    }

    /// True when `seq` is the newest counts request. Marks it accepted.
    pub fn accept_counts(&mut self, seq: u64) -> bool {
        self.counts.accept(seq)
    }

    pub fn fetch_page(&mut self, query: TableQuery) {
        let seq = self.pages.issue();
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = match service.fetch_estimates_page(&query).await {
                Ok(page) => UiEvent::PageLoaded { seq, page },
                Err(e) => UiEvent::PageFailed { seq, error: e.to_string() },
            };
            let _ = tx.send(event);
            ctx.request_repaint();
        });
    }

    pub fn fetch_counts(&mut self) {
        let seq = self.counts.issue();
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = match service.fetch_workflow_counts().await {
                Ok(counts) => UiEvent::CountsLoaded { seq, counts },
                Err(e) => UiEvent::CountsFailed { seq, error: e.to_string() },
            };
            let _ = tx.send(event);
            ctx.request_repaint();
        });
    }

    pub fn update_status(&self, id: i64, stage: WorkflowStage) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = service
                .update_estimate_status(id, stage)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(UiEvent::StatusUpdated { id, stage, result });
            ctx.request_repaint();
        });
    }

    pub fn create_customer(&self, customer: NewCustomer) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = service.create_customer(customer).await.map_err(|e| e.to_string());
            let _ = tx.send(UiEvent::CustomerSaved(result));
            ctx.request_repaint();
        });
    }

    pub fn create_tag(&self, tag: NewTag) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = service.create_tag(tag).await.map_err(|e| e.to_string());
            let _ = tx.send(UiEvent::TagCreated(result));
            ctx.request_repaint();
        });
    }

    pub fn create_referral_source(&self, source: NewReferralSource) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = service
                .create_referral_source(source)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(UiEvent::ReferralSourceCreated(result));
            ctx.request_repaint();
        });
    }

    pub fn create_fleet(&self, fleet: NewFleet) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = service.create_fleet(fleet).await.map_err(|e| e.to_string());
            let _ = tx.send(UiEvent::FleetCreated(result));
            ctx.request_repaint();
        });
    }
}
