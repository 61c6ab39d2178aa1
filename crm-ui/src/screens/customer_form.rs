//! The customer intake form: contact lists with bounded add/remove,
//! collapsible optional sections, and modal dialogs for ancillary records.

use crm_core::{PaymentTerms, PhoneType, PreferredContact};
use egui::Ui;

use crate::app::CrmApp;

pub struct CustomerFormScreen;

impl CustomerFormScreen {
    const GROUP_WIDTH: f32 = 560.0;

    pub fn show(app: &mut CrmApp, ui: &mut Ui) {
        ui.heading("New Customer");
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            let group_width = ui.available_width().min(Self::GROUP_WIDTH);

            ui.allocate_ui(egui::vec2(group_width, 0.0), |ui| {
                ui.group(|ui| {
                    ui.set_min_width(group_width - 20.0);
                    Self::name_section(app, ui);
                    ui.add_space(8.0);
                    Self::phone_section(app, ui);
                    ui.add_space(8.0);
                    Self::email_section(app, ui);
                    ui.add_space(8.0);
                    Self::preferred_contact_section(app, ui);
                });
            });

            ui.add_space(10.0);
            Self::additional_info_section(app, ui, group_width);
            ui.add_space(6.0);
            Self::address_section(app, ui, group_width);
            ui.add_space(6.0);
            Self::fees_section(app, ui, group_width);

            ui.add_space(12.0);
            Self::errors_and_submit(app, ui);
        });

        Self::tag_dialog(app, ui.ctx());
        Self::referral_dialog(app, ui.ctx());
        Self::fleet_dialog(app, ui.ctx());
    }

    fn name_section(app: &mut CrmApp, ui: &mut Ui) {
        egui::Grid::new("name_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label("First Name:");
                ui.text_edit_singleline(&mut app.form.first_name);
                ui.end_row();
                ui.label("Last Name:");
                ui.text_edit_singleline(&mut app.form.last_name);
                ui.end_row();
            });
    }

    fn phone_section(app: &mut CrmApp, ui: &mut Ui) {
        ui.label(egui::RichText::new("Phone Numbers").strong());

        let mut remove: Option<usize> = None;
        for (i, phone) in app.form.phones.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt(("phone_type", i))
                    .width(90.0)
                    .selected_text(phone.phone_type.label())
                    .show_ui(ui, |ui| {
                        for phone_type in PhoneType::all() {
                            ui.selectable_value(
                                &mut phone.phone_type,
                                *phone_type,
                                phone_type.label(),
                            );
                        }
                    });
                ui.add(
                    egui::TextEdit::singleline(&mut phone.number)
                        .hint_text("555-0100")
                        .desired_width(160.0),
                );
                // The first row has no remove control; one phone must remain.
                if i > 0 && ui.small_button("✖").clicked() {
                    remove = Some(i);
                }
            });
        }
        if let Some(index) = remove {
            app.form.remove_phone(index);
        }
        if app.form.phones.len() < crate::forms::customer::MAX_CONTACT_ENTRIES
            && ui.small_button("+ Add phone").clicked()
        {
            app.form.add_phone();
        }
    }

    fn email_section(app: &mut CrmApp, ui: &mut Ui) {
        ui.label(egui::RichText::new("Emails").strong());

        let mut remove: Option<usize> = None;
        for (i, email) in app.form.emails.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(email)
                        .hint_text("name@example.com")
                        .desired_width(260.0),
                );
                if i > 0 && ui.small_button("✖").clicked() {
                    remove = Some(i);
                }
            });
        }
        if let Some(index) = remove {
            app.form.remove_email(index);
        }
        if app.form.emails.len() < crate::forms::customer::MAX_CONTACT_ENTRIES
            && ui.small_button("+ Add email").clicked()
        {
            app.form.add_email();
        }
    }

    fn preferred_contact_section(app: &mut CrmApp, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Preferred Contact:");
            ui.selectable_value(&mut app.form.preferred_contact, PreferredContact::Sms, "SMS");
            ui.selectable_value(
                &mut app.form.preferred_contact,
                PreferredContact::Email,
                "Email",
            );
            ui.selectable_value(
                &mut app.form.preferred_contact,
                PreferredContact::Both,
                "Both",
            );
        });
    }

    fn additional_info_section(app: &mut CrmApp, ui: &mut Ui, group_width: f32) {
        let header = egui::CollapsingHeader::new("Additional Info")
            .open(Some(app.form.show_additional_info));
        let response = header.show(ui, |ui| {
            ui.set_min_width(group_width - 40.0);
            egui::Grid::new("additional_info_grid")
                .num_columns(3)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Tags:");
                    ui.text_edit_singleline(&mut app.form.tags);
                    if ui.small_button("New tag...").clicked() {
                        app.dialogs.tag_open = true;
                    }
                    ui.end_row();

                    ui.label("Referral Source:");
                    ui.text_edit_singleline(&mut app.form.referral_source);
                    if ui.small_button("New source...").clicked() {
                        app.dialogs.referral_open = true;
                    }
                    ui.end_row();

                    ui.label("Company:");
                    ui.text_edit_singleline(&mut app.form.company);
                    ui.label("");
                    ui.end_row();

                    ui.label("Fleet:");
                    ui.text_edit_singleline(&mut app.form.fleet);
                    if ui.small_button("New fleet...").clicked() {
                        app.dialogs.fleet_open = true;
                    }
                    ui.end_row();

                    ui.label("Payment Terms:");
                    egui::ComboBox::from_id_salt("payment_terms")
                        .width(120.0)
                        .selected_text(
                            app.form
                                .payment_terms
                                .map(|t| t.label())
                                .unwrap_or("None"),
                        )
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut app.form.payment_terms, None, "None");
                            for terms in PaymentTerms::all() {
                                ui.selectable_value(
                                    &mut app.form.payment_terms,
                                    Some(*terms),
                                    terms.label(),
                                );
                            }
                        });
                    ui.label("");
                    ui.end_row();
                });

            ui.checkbox(&mut app.form.on_shop_default, "Use shop default settings");
            ui.label("Note:");
            ui.text_edit_multiline(&mut app.form.note);
        });
        if response.header_response.clicked() {
            app.form.show_additional_info = !app.form.show_additional_info;
        }
    }

    fn address_section(app: &mut CrmApp, ui: &mut Ui, group_width: f32) {
        let header = egui::CollapsingHeader::new("Address").open(Some(app.form.show_address));
        let response = header.show(ui, |ui| {
            ui.set_min_width(group_width - 40.0);
            egui::Grid::new("address_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Country:");
                    ui.text_edit_singleline(&mut app.form.country);
                    ui.end_row();
                    ui.label("Address:");
                    ui.text_edit_singleline(&mut app.form.address1);
                    ui.end_row();
                    ui.label("Unit / Suite:");
                    ui.text_edit_singleline(&mut app.form.address2);
                    ui.end_row();
                    ui.label("City:");
                    ui.text_edit_singleline(&mut app.form.city);
                    ui.end_row();
                    ui.label("State:");
                    ui.text_edit_singleline(&mut app.form.state);
                    ui.end_row();
                    ui.label("Zip:");
                    ui.text_edit_singleline(&mut app.form.zip_code);
                    ui.end_row();
                });
        });
        if response.header_response.clicked() {
            app.form.show_address = !app.form.show_address;
        }
    }

    fn fees_section(app: &mut CrmApp, ui: &mut Ui, group_width: f32) {
        let header = egui::CollapsingHeader::new("Fees").open(Some(app.form.show_fees));
        let response = header.show(ui, |ui| {
            ui.set_min_width(group_width - 40.0);
            ui.horizontal(|ui| {
                ui.label("Default Fee:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.form.default_fee)
                        .hint_text("0.00")
                        .desired_width(100.0),
                );
            });
        });
        if response.header_response.clicked() {
            app.form.show_fees = !app.form.show_fees;
        }
    }

    fn errors_and_submit(app: &mut CrmApp, ui: &mut Ui) {
        if !app.form.errors.is_empty() {
            for error in app.form.errors.clone() {
                ui.colored_label(egui::Color32::RED, error);
            }
            ui.add_space(6.0);
        }
        if ui.button("Save Customer").clicked() {
            app.save_customer();
        }
    }

    fn tag_dialog(app: &mut CrmApp, ctx: &egui::Context) {
        if !app.dialogs.tag_open {
            return;
        }
        egui::Window::new("New Tag")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut app.dialogs.tag_name);
                });
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        app.dialogs.tag_open = false;
                        app.dialogs.tag_name.clear();
                    }
                    if ui.button("Save").clicked() {
                        app.save_tag();
                    }
                });
            });
    }

    fn referral_dialog(app: &mut CrmApp, ctx: &egui::Context) {
        if !app.dialogs.referral_open {
            return;
        }
        egui::Window::new("New Referral Source")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut app.dialogs.referral_name);
                });
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        app.dialogs.referral_open = false;
                        app.dialogs.referral_name.clear();
                    }
                    if ui.button("Save").clicked() {
                        app.save_referral_source();
                    }
                });
            });
    }

    fn fleet_dialog(app: &mut CrmApp, ctx: &egui::Context) {
        if !app.dialogs.fleet_open {
            return;
        }
        egui::Window::new("New Fleet")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("fleet_dialog_grid")
                    .num_columns(2)
                    .spacing([10.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Company:");
                        ui.text_edit_singleline(&mut app.dialogs.fleet_company);
                        ui.end_row();

                        ui.label("Phone:");
                        ui.horizontal(|ui| {
                            egui::ComboBox::from_id_salt("fleet_phone_type")
                                .width(90.0)
                                .selected_text(app.dialogs.fleet_phone.phone_type.label())
                                .show_ui(ui, |ui| {
                                    for phone_type in PhoneType::all() {
                                        ui.selectable_value(
                                            &mut app.dialogs.fleet_phone.phone_type,
                                            *phone_type,
                                            phone_type.label(),
                                        );
                                    }
                                });
                            ui.add(
                                egui::TextEdit::singleline(&mut app.dialogs.fleet_phone.number)
                                    .desired_width(140.0),
                            );
                        });
                        ui.end_row();

                        ui.label("Email:");
                        ui.text_edit_singleline(&mut app.dialogs.fleet_email);
                        ui.end_row();
                    });
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        app.dialogs.fleet_open = false;
                    }
                    if ui.button("Save").clicked() {
                        app.save_fleet();
                    }
                });
            });
    }
}
