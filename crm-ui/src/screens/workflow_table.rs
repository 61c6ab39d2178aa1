//! The estimate workflow table: tabs, sortable grid, inline stage edits,
//! detail drawer, and pagination footer.

use crm_core::{Estimate, SortOrder, WorkflowStage};
use egui::Ui;

use crate::app::CrmApp;
use crate::store::{Action, WorkflowTab};
use crate::utils::{format_date, format_money, opt_display};

/// Page sizes offered in the footer dropdown.
const PAGE_SIZES: [u32; 3] = [10, 25, 50];

/// One interaction with a table row, recorded during the render pass and
/// applied afterwards. Rebuilt every frame, so it can never capture a
/// stale query descriptor.
#[derive(Debug, Clone)]
enum RowEvent {
    StageSelected { id: i64, stage: WorkflowStage },
    EditClicked(Box<Estimate>),
}

/// Collects row interactions for one render pass.
#[derive(Debug, Default)]
struct RowActions {
    events: Vec<RowEvent>,
}

impl RowActions {
    fn stage_selected(&mut self, id: i64, stage: WorkflowStage) {
        self.events.push(RowEvent::StageSelected { id, stage });
    }

    fn edit_clicked(&mut self, estimate: &Estimate) {
        self.events.push(RowEvent::EditClicked(Box::new(estimate.clone())));
    }
}

pub struct WorkflowTableScreen;

impl WorkflowTableScreen {
    pub fn show(app: &mut CrmApp, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Estimate Workflow");
            if app.store.loading {
                ui.spinner();
            }
        });
        ui.separator();

        Self::tab_strip(app, ui);
        ui.add_space(6.0);
        Self::search_box(app, ui);
        ui.add_space(6.0);

        let mut actions = RowActions::default();
        let rows: Vec<Estimate> = app
            .store
            .visible_estimates()
            .into_iter()
            .cloned()
            .collect();

        egui::ScrollArea::both().show(ui, |ui| {
            Self::table_grid(app, ui, &rows, &mut actions);
        });

        for event in actions.events {
            match event {
                RowEvent::StageSelected { id, stage } => app.begin_status_edit(id, stage),
                RowEvent::EditClicked(estimate) => {
                    app.store.dispatch(Action::OpenDrawer(*estimate));
                }
            }
        }

        ui.add_space(8.0);
        Self::pagination_footer(app, ui);

        if app.store.drawer_open {
            Self::detail_drawer(app, ui.ctx());
        }
    }

    fn tab_strip(app: &mut CrmApp, ui: &mut Ui) {
        ui.horizontal(|ui| {
            for tab in WorkflowTab::all() {
                let count = app.store.tab_count(tab);
                // Zero badges are hidden, not rendered as "(0)".
                let text = if count > 0 {
                    format!("{} ({count})", tab.label())
                } else {
                    tab.label().to_string()
                };
                if ui
                    .selectable_label(app.store.active_tab == tab, text)
                    .clicked()
                {
                    app.store.dispatch(Action::SelectTab(tab));
                }
            }
        });
    }

    fn search_box(app: &mut CrmApp, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            let mut query = app.store.table.query().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut query)
                    .hint_text("Order #, name, or customer")
                    .desired_width(240.0),
            );
            if response.changed() {
                // Kept on the descriptor for the next committed fetch, but
                // typing alone never triggers a refetch.
                app.store.dispatch(Action::SetQuery(query));
            }
        });
    }

    fn sortable_header(app: &mut CrmApp, ui: &mut Ui, key: &str, title: &str) {
        let marker = match app.store.table.sort() {
            Some(spec) if spec.key == key => match spec.order {
                SortOrder::Asc => " ⬆",
                SortOrder::Desc => " ⬇",
            },
            _ => "",
        };
        if ui
            .button(egui::RichText::new(format!("{title}{marker}")).strong())
            .clicked()
        {
            app.store.dispatch(Action::SortBy(key.to_string()));
        }
    }

    fn table_grid(app: &mut CrmApp, ui: &mut Ui, rows: &[Estimate], actions: &mut RowActions) {
        egui::Grid::new("workflow_grid")
            .num_columns(9)
            .striped(true)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                Self::sortable_header(app, ui, "order_no", "Order #");
                Self::sortable_header(app, ui, "order_name", "Order Name");
                Self::sortable_header(app, ui, "customer_name", "Customer");
                Self::sortable_header(app, ui, "total", "Total");
                ui.label(egui::RichText::new("Workflow").strong());
                ui.label(egui::RichText::new("Technician").strong());
                ui.label(egui::RichText::new("Due").strong());
                Self::sortable_header(app, ui, "created_date", "Created");
                ui.label("");
                ui.end_row();

                for row in rows {
                    ui.label(&row.order_no);
                    ui.label(&row.order_name);
                    ui.label(&row.customer_name);
                    ui.label(format_money(&row.total));
                    Self::stage_dropdown(ui, row, app, actions);
                    ui.label(opt_display(&row.technician));
                    ui.label(format_date(&row.due_date));
                    ui.label(format_date(&Some(row.created_date)));
                    if ui.button("Edit").clicked() {
                        actions.edit_clicked(row);
                    }
                    ui.end_row();
                }
            });

        if rows.is_empty() && !app.store.loading {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.label("No estimates to show");
            });
        }
    }

    fn stage_dropdown(ui: &mut Ui, row: &Estimate, app: &CrmApp, actions: &mut RowActions) {
        let submitting = app.status_edit.is_submitting();
        ui.add_enabled_ui(!submitting, |ui| {
            egui::ComboBox::from_id_salt(("workflow_stage", row.id))
                .width(110.0)
                .selected_text(row.workflow.label())
                .show_ui(ui, |ui| {
                    for stage in WorkflowStage::all() {
                        if ui
                            .selectable_label(row.workflow == *stage, stage.label())
                            .clicked()
                            && row.workflow != *stage
                        {
                            actions.stage_selected(row.id, *stage);
                        }
                    }
                });
        });
    }

    fn pagination_footer(app: &mut CrmApp, ui: &mut Ui) {
        let page_index = app.store.table.page_index();
        let page_count = app.store.page_count();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(page_index > 1, egui::Button::new("◀ Prev"))
                .clicked()
            {
                app.store.dispatch(Action::SetPageIndex(page_index - 1));
            }
            ui.label(format!("Page {page_index} of {page_count}"));
            if ui
                .add_enabled(u64::from(page_index) < page_count, egui::Button::new("Next ▶"))
                .clicked()
            {
                app.store.dispatch(Action::SetPageIndex(page_index + 1));
            }

            ui.separator();
            ui.label("Rows per page:");
            let current_size = app.store.table.page_size();
            egui::ComboBox::from_id_salt("page_size")
                .width(60.0)
                .selected_text(current_size.to_string())
                .show_ui(ui, |ui| {
                    for size in PAGE_SIZES {
                        if ui
                            .selectable_label(current_size == size, size.to_string())
                            .clicked()
                        {
                            // Resets to page 1 inside the descriptor.
                            app.store.dispatch(Action::SetPageSize(size));
                        }
                    }
                });

            ui.separator();
            ui.label(format!("{} total", app.store.total));
        });
    }

    fn detail_drawer(app: &mut CrmApp, ctx: &egui::Context) {
        let mut close = false;
        egui::Window::new("Estimate Details")
            .id(egui::Id::new("estimate_drawer"))
            .title_bar(false)
            .anchor(egui::Align2::RIGHT_TOP, [-8.0, 48.0])
            .default_width(320.0)
            .show(ctx, |ui| {
                let Some(estimate) = &app.store.selected else {
                    close = true;
                    return;
                };

                ui.horizontal(|ui| {
                    ui.heading(&estimate.order_no);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✖").clicked() {
                            close = true;
                        }
                    });
                });
                ui.separator();

                egui::Grid::new("drawer_grid")
                    .num_columns(2)
                    .spacing([10.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Order Name:");
                        ui.label(&estimate.order_name);
                        ui.end_row();
                        ui.label("Customer:");
                        ui.label(&estimate.customer_name);
                        ui.end_row();
                        ui.label("Total:");
                        ui.label(format_money(&estimate.total));
                        ui.end_row();
                        ui.label("Workflow:");
                        ui.label(estimate.workflow.label());
                        ui.end_row();
                        ui.label("Authorized:");
                        ui.label(if estimate.is_authorized { "Yes" } else { "No" });
                        ui.end_row();
                        ui.label("Technician:");
                        ui.label(opt_display(&estimate.technician));
                        ui.end_row();
                        ui.label("Appointment:");
                        ui.label(opt_display(&estimate.appointment));
                        ui.end_row();
                        ui.label("Inspection:");
                        ui.label(opt_display(&estimate.inspection_status));
                        ui.end_row();
                        ui.label("Order Status:");
                        ui.label(opt_display(&estimate.order_status));
                        ui.end_row();
                        ui.label("Due:");
                        ui.label(format_date(&estimate.due_date));
                        ui.end_row();
                        ui.label("Payment Due:");
                        ui.label(format_date(&estimate.payment_due_date));
                        ui.end_row();
                        ui.label("Authorized On:");
                        ui.label(format_date(&estimate.authorized_date));
                        ui.end_row();
                        ui.label("Invoiced On:");
                        ui.label(format_date(&estimate.invoice_date));
                        ui.end_row();
                        ui.label("Fully Paid:");
                        ui.label(format_date(&estimate.fully_paid_date));
                        ui.end_row();
                        ui.label("Created:");
                        ui.label(format_date(&Some(estimate.created_date)));
                        ui.end_row();
                    });

                if !estimate.tags.is_empty() {
                    ui.add_space(6.0);
                    ui.label(egui::RichText::new("Tags").strong());
                    ui.horizontal_wrapped(|ui| {
                        for tag in &estimate.tags {
                            ui.small_button(tag);
                        }
                    });
                }
            });

        if close {
            app.store.dispatch(Action::CloseDrawer);
        }
    }
}
