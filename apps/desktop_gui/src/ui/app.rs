use std::time::Duration;

use arboard::Clipboard;
use chrono::Utc;
use crossbeam_channel::{Receiver, Sender};
use dapp_core::{InputState, NotificationKind, ViewModel};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent, orchestration::dispatch_backend_command, reducer::GuiState,
};

const CONTRACT_BLURB: &str = "The button below will deploy a SimpleStorage smart contract where you can store a number value. By default the initial stored value is equal to 123 (you can change that in the Solidity smart contract). After the contract is deployed you can either read stored value from smart contract or set a new one. You can do that using the interface below.";

pub struct DappGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: GuiState,
    inputs: InputState,
    new_value_text: String,
}

impl DappGuiApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: GuiState::default(),
            inputs: InputState::default(),
            new_value_text: String::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.state.apply(event);
        }
        self.state.prune_toasts(Utc::now());
    }

    fn send(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status);
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.state.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.state.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_account_section(&mut self, ui: &mut egui::Ui, view: &ViewModel) {
        egui::Grid::new("account_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Your ETH address:");
                ui.label(egui::RichText::new(&view.eth_address).strong().monospace());
                ui.end_row();

                ui.label("Polyjuice address:");
                ui.label(egui::RichText::new(&view.short_address).strong().monospace());
                ui.end_row();

                ui.label("Balance:");
                ui.horizontal(|ui| {
                    match &view.balance {
                        Some(balance) => {
                            ui.label(egui::RichText::new(format!("{balance} CKB")).strong());
                        }
                        None => {
                            ui.spinner();
                        }
                    }
                    if ui
                        .add_enabled(self.state.ready, egui::Button::new("Refresh").small())
                        .clicked()
                    {
                        self.send(BackendCommand::RefreshBalance);
                    }
                });
                ui.end_row();

                ui.label("Deployed contract address:");
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&view.contract_address).strong().monospace());
                    if self.state.snapshot.contract.is_some() && ui.small_button("Copy").clicked()
                    {
                        match Clipboard::new()
                            .and_then(|mut clipboard| clipboard.set_text(view.contract_address.clone()))
                        {
                            Ok(()) => self.state.status = "Contract address copied".to_string(),
                            Err(err) => {
                                tracing::warn!("clipboard unavailable: {err}");
                                self.state.status = format!("Could not copy address: {err}");
                            }
                        }
                    }
                });
                ui.end_row();

                ui.label("Deployed contract tx hash:");
                ui.label(egui::RichText::new(&view.deploy_tx_hash).strong().monospace());
                ui.end_row();
            });
    }

    fn show_contract_section(&mut self, ui: &mut egui::Ui, view: &ViewModel) {
        ui.label(CONTRACT_BLURB);
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(view.deploy_enabled, egui::Button::new("Deploy contract"))
                .clicked()
            {
                self.send(BackendCommand::DeployContract);
            }
            ui.label("or");
            ui.add(
                egui::TextEdit::singleline(&mut self.inputs.existing_contract_address)
                    .id_salt("existing_contract_address")
                    .hint_text("Existing contract id")
                    .desired_width(320.0),
            );
            // Enablement was computed before this frame's edit; recompute from the live text.
            let use_existing_enabled = view.deploy_enabled
                && !self.inputs.existing_contract_address.is_empty();
            if ui
                .add_enabled(use_existing_enabled, egui::Button::new("Use existing contract"))
                .clicked()
            {
                let address = self.inputs.existing_contract_address.clone();
                self.send(BackendCommand::UseExistingContract { address });
            }
        });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(view.get_enabled, egui::Button::new("Get stored value"))
                .clicked()
            {
                self.send(BackendCommand::GetStoredValue);
            }
            if let Some(stored) = &view.stored_value {
                ui.label(format!("Stored value: {stored}"));
            }
        });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.new_value_text)
                    .id_salt("new_stored_value")
                    .desired_width(160.0),
            );
            if response.changed() {
                self.inputs.set_new_stored_value_text(&self.new_value_text);
            }
            if ui
                .add_enabled(view.set_enabled, egui::Button::new("Set new stored value"))
                .clicked()
            {
                self.send(BackendCommand::SetStoredValue {
                    value: self.inputs.new_stored_value,
                });
            }
            if !view.new_stored_value_label.is_empty() {
                ui.weak(format!("will send: {}", view.new_stored_value_label));
            }
        });
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                for (index, toast) in self.state.toasts.iter().enumerate() {
                    let fill = match toast.kind {
                        NotificationKind::Progress => egui::Color32::from_rgb(52, 73, 110),
                        NotificationKind::Success => egui::Color32::from_rgb(46, 98, 64),
                        NotificationKind::Failure => egui::Color32::from_rgb(111, 53, 53),
                        NotificationKind::Info => egui::Color32::from_rgb(64, 64, 72),
                    };
                    egui::Frame::NONE
                        .fill(fill)
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::symmetric(12, 10))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                if toast.kind == NotificationKind::Progress {
                                    ui.spinner();
                                }
                                ui.label(
                                    egui::RichText::new(&toast.message).color(egui::Color32::WHITE),
                                );
                                if toast.auto_closes() && ui.small_button("x").clicked() {
                                    dismissed = Some(index);
                                }
                            });
                        });
                    ui.add_space(6.0);
                }
            });
        if let Some(index) = dismissed {
            self.state.dismiss_toast(index);
        }
    }
}

impl eframe::App for DappGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let view = ViewModel::build(&self.state.snapshot, &self.inputs);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if view.transaction_in_progress {
                    ui.spinner();
                }
                ui.weak(self.state.status.as_str());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("SimpleStorage on Godwoken");
                ui.add_space(8.0);
                self.show_status_banner(ui);
                self.show_account_section(ui, &view);
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);
                self.show_contract_section(ui, &view);
            });
        });

        self.show_toasts(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
