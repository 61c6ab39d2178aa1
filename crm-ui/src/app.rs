use std::sync::Arc;

use crm_core::{NewFleet, NewReferralSource, NewTag, PhoneEntry, StatusEdit, WorkflowService};
use egui::Context;
use tokio::runtime::Handle;
use tracing::{error, info};

use crate::forms::{CustomerForm, PhoneDraft};
use crate::screens::{CustomerFormScreen, WorkflowTableScreen};
use crate::store::{Action, WorkflowStore};
use crate::tasks::{TaskBridge, UiEvent};

/// Which screen is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Workflow,
    NewCustomer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Error,
}

/// Draft state of the three modal sub-dialogs on the intake form.
#[derive(Debug, Clone, Default)]
pub struct DialogState {
    pub tag_open: bool,
    pub tag_name: String,
    pub referral_open: bool,
    pub referral_name: String,
    pub fleet_open: bool,
    pub fleet_company: String,
    pub fleet_phone: PhoneDraft,
    pub fleet_email: String,
}

/// Main application state
pub struct CrmApp {
    pub current_screen: Screen,
    pub store: WorkflowStore,
    pub form: CustomerForm,
    pub dialogs: DialogState,
    pub status_message: Option<(String, MessageType)>,
    pub status_edit: StatusEdit,
    bridge: TaskBridge,
    /// Descriptor generation of the last issued page fetch. A mismatch
    /// against the store's descriptor means a committed change is pending.
    last_fetched_generation: Option<u64>,
}

impl CrmApp {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Handle, service: Arc<dyn WorkflowService>) -> Self {
        Self {
            current_screen: Screen::Workflow,
            store: WorkflowStore::default(),
            form: CustomerForm::new(),
            dialogs: DialogState::default(),
            status_message: None,
            status_edit: StatusEdit::default(),
            bridge: TaskBridge::new(runtime, service, cc.egui_ctx.clone()),
            last_fetched_generation: None,
        }
    }

    pub fn show_message(&mut self, msg: impl Into<String>, msg_type: MessageType) {
        self.status_message = Some((msg.into(), msg_type));
    }

    pub fn clear_message(&mut self) {
        self.status_message = None;
    }

    /// Dropdown selection on a row. Ignored while another edit is in flight.
    pub fn begin_status_edit(&mut self, id: i64, stage: crm_core::WorkflowStage) {
        if let Some((id, stage)) = self.status_edit.begin(id, stage) {
            info!(id, stage = stage.label(), "updating workflow stage");
            self.bridge.update_status(id, stage);
        }
    }

    pub fn save_customer(&mut self) {
        match self.form.validate() {
            Ok(customer) => {
                self.bridge.create_customer(customer);
                self.show_message("Saving customer...", MessageType::Info);
            }
            Err(()) => {
                self.show_message("Please fix validation errors", MessageType::Error);
            }
        }
    }

    pub fn save_tag(&mut self) {
        let name = self.dialogs.tag_name.trim().to_string();
        if !name.is_empty() {
            self.bridge.create_tag(NewTag { name });
        }
        self.dialogs.tag_open = false;
        self.dialogs.tag_name.clear();
    }

    pub fn save_referral_source(&mut self) {
        let name = self.dialogs.referral_name.trim().to_string();
        if !name.is_empty() {
            self.bridge.create_referral_source(NewReferralSource { name });
        }
        self.dialogs.referral_open = false;
        self.dialogs.referral_name.clear();
    }

    pub fn save_fleet(&mut self) {
        let company_name = self.dialogs.fleet_company.trim().to_string();
        if !company_name.is_empty() {
            let mut phone_numbers = Vec::new();
            let number = self.dialogs.fleet_phone.number.trim();
            if !number.is_empty() {
                phone_numbers.push(PhoneEntry {
                    phone_type: self.dialogs.fleet_phone.phone_type,
                    number: number.to_string(),
                });
            }
            let mut emails = Vec::new();
            let email = self.dialogs.fleet_email.trim();
            if !email.is_empty() {
                emails.push(email.to_string());
            }
            self.bridge.create_fleet(NewFleet {
                company_name,
                phone_numbers,
                emails,
            });
        }
        self.dialogs.fleet_open = false;
        self.dialogs.fleet_company.clear();
        self.dialogs.fleet_phone = PhoneDraft::default();
        self.dialogs.fleet_email.clear();
    }

    /// Applies completed background calls to the store.
    fn process_events(&mut self) {
        for event in self.bridge.drain() {
            match event {
                UiEvent::PageLoaded { seq, page } => {
                    // Stale responses lose to any newer issued request.
                    if self.bridge.accept_page(seq) {
                        self.store.dispatch(Action::PageLoaded(page));
                    }
                }
                UiEvent::PageFailed { seq, error } => {
                    if self.bridge.accept_page(seq) {
                        error!(%error, "page fetch failed");
                        self.store.dispatch(Action::PageFailed);
                        self.show_message("Failed to load estimates", MessageType::Error);
                    }
                }
                UiEvent::CountsLoaded { seq, counts } => {
                    if self.bridge.accept_counts(seq) {
                        self.store.dispatch(Action::CountsLoaded(counts));
                    }
                }
                UiEvent::CountsFailed { seq, error } => {
                    if self.bridge.accept_counts(seq) {
                        error!(%error, "counts fetch failed");
                    }
                }
                UiEvent::StatusUpdated { id, stage, result } => {
                    self.status_edit.settle();
                    match result {
                        Ok(()) => {
                            // Refetch the page with the unchanged descriptor;
                            // the server is the source of truth for the row.
                            self.refetch_current_page();
                        }
                        Err(error) => {
                            error!(id, stage = stage.label(), %error, "stage update failed");
                        }
                    }
                }
                UiEvent::CustomerSaved(result) => match result {
                    Ok(customer) => {
                        info!(id = customer.id, "customer created");
                        self.form = CustomerForm::new();
                        self.show_message(
                            format!("Customer {} {} saved", customer.first_name, customer.last_name),
                            MessageType::Success,
                        );
                    }
                    Err(error) => {
                        error!(%error, "customer create failed");
                        self.show_message("Failed to save customer", MessageType::Error);
                    }
                },
                UiEvent::TagCreated(result) => match result {
                    Ok(tag) => self.show_message(format!("Tag '{}' created", tag.name), MessageType::Success),
                    Err(error) => {
                        error!(%error, "tag create failed");
                        self.show_message("Failed to create tag", MessageType::Error);
                    }
                },
                UiEvent::ReferralSourceCreated(result) => match result {
                    Ok(source) => self.show_message(
                        format!("Referral source '{}' created", source.name),
                        MessageType::Success,
                    ),
                    Err(error) => {
                        error!(%error, "referral source create failed");
                        self.show_message("Failed to create referral source", MessageType::Error);
                    }
                },
                UiEvent::FleetCreated(result) => match result {
                    Ok(fleet) => self.show_message(
                        format!("Fleet '{}' created", fleet.company_name),
                        MessageType::Success,
                    ),
                    Err(error) => {
                        error!(%error, "fleet create failed");
                        self.show_message("Failed to create fleet", MessageType::Error);
                    }
                },
            }
        }
    }

    /// Issues one page fetch and one counts fetch per committed descriptor
    /// change. The first frame also kicks off the initial load.
    fn sync_fetches(&mut self) {
        let generation = self.store.table.generation();
        if self.last_fetched_generation != Some(generation) {
            self.last_fetched_generation = Some(generation);
            self.store.loading = true;
            self.bridge.fetch_page(self.store.table.clone());
            self.bridge.fetch_counts();
        }
    }

    /// Reloads the current page without touching the descriptor.
    fn refetch_current_page(&mut self) {
        self.store.loading = true;
        self.bridge.fetch_page(self.store.table.clone());
    }
}

impl eframe::App for CrmApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_events();
        self.sync_fetches();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Customer").clicked() {
                        self.form = CustomerForm::new();
                        self.current_screen = Screen::NewCustomer;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Navigation sidebar
        egui::SidePanel::left("nav_panel")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Navigation");
                });
                ui.separator();

                if ui
                    .selectable_label(self.current_screen == Screen::Workflow, "📋 Workflow")
                    .clicked()
                {
                    self.current_screen = Screen::Workflow;
                }

                if ui
                    .selectable_label(self.current_screen == Screen::NewCustomer, "👤 New Customer")
                    .clicked()
                {
                    self.current_screen = Screen::NewCustomer;
                }
            });

        // Status bar at bottom
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some((msg, msg_type)) = &self.status_message {
                    let color = match msg_type {
                        MessageType::Info => egui::Color32::GRAY,
                        MessageType::Success => egui::Color32::GREEN,
                        MessageType::Error => egui::Color32::RED,
                    };
                    ui.colored_label(color, msg);

                    if ui.small_button("✖").clicked() {
                        self.clear_message();
                    }
                }
            });
        });

        // Main content area
        egui::CentralPanel::default().show(ctx, |ui| match self.current_screen {
            Screen::Workflow => WorkflowTableScreen::show(self, ui),
            Screen::NewCustomer => CustomerFormScreen::show(self, ui),
        });
    }
}
