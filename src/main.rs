slint::include_modules!();

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use chroma_picker::color::{format_color, format_hex, parse_color, ColorValues};
use chroma_picker::palette_item::{swatches_of, ItemId, Swatch};
use chroma_picker::platform::{Notifier, ProcessRestarter, Restarter, SystemClipboard};
use chroma_picker::{logging, AppContext, ColorType, Page, PalettePage, Rgb};
use slint::{Color, ModelRc, SharedString, VecModel};
use tracing::{error, info, warn};

const DEFAULT_COLOR: Rgb = Rgb::new(203, 182, 172);
const HISTORY_SHOWN: usize = 16;

/// Shows messages in the window's modal dialog.
struct DialogNotifier {
    ui: slint::Weak<AppWindow>,
}

impl DialogNotifier {
    fn show(&self, message: &str, is_error: bool) {
        if let Some(ui) = self.ui.upgrade() {
            ui.set_message_text(message.into());
            ui.set_message_is_error(is_error);
            ui.set_message_open(true);
        }
    }
}

impl Notifier for DialogNotifier {
    fn info(&self, message: &str) {
        self.show(message, false);
    }

    fn error(&self, message: &str) {
        self.show(message, true);
    }
}

/// Defers the relaunch until the user has dismissed the import message.
struct RestartAfterDialog {
    requested: Rc<Cell<bool>>,
}

impl Restarter for RestartAfterDialog {
    fn request_restart(&self) -> chroma_picker::Result<()> {
        self.requested.set(true);
        Ok(())
    }
}

struct Shell {
    ctx: AppContext,
    palette: PalettePage,
    current: Rgb,
}

fn to_color(c: Rgb) -> Color {
    Color::from_rgb_u8(c.r, c.g, c.b)
}

fn swatch_model(swatches: Vec<Swatch>) -> ModelRc<SwatchData> {
    let data: Vec<SwatchData> = swatches
        .into_iter()
        .map(|s| SwatchData {
            fill: to_color(s.color),
            tip: s.tooltip.into(),
        })
        .collect();
    ModelRc::from(Rc::new(VecModel::from(data)))
}

fn named_values(values: ColorValues) -> ModelRc<NamedValue> {
    let rows = [
        ("HEX", values.hex),
        ("RGB", values.rgb),
        ("HSV", values.hsv),
        ("HSL", values.hsl),
        ("CMYK", values.cmyk),
    ]
    .into_iter()
    .map(|(label, value)| NamedValue {
        label: label.into(),
        value: value.into(),
    })
    .collect::<Vec<_>>();
    ModelRc::from(Rc::new(VecModel::from(rows)))
}

fn values_of(shell: &Shell, color: Rgb) -> ColorValues {
    let settings = shell.ctx.settings();
    ColorValues::of(color, settings.rgb_separator(), settings.hex_uppercase())
}

fn calculate_shades(c: Rgb) -> [Rgb; 4] {
    [c.shade(1.5), c.shade(1.2), c.shade(0.7), c.shade(0.5)]
}

fn sync_picker(ui: &AppWindow, shell: &Shell) {
    let c = shell.current;
    ui.set_current_color(to_color(c));
    ui.set_picker_values(named_values(values_of(shell, c)));
    let shades: Vec<Color> = calculate_shades(c).into_iter().map(to_color).collect();
    ui.set_shades(ModelRc::from(Rc::new(VecModel::from(shades))));
    let history: Vec<Color> = shell
        .ctx
        .history
        .colors()
        .iter()
        .take(HISTORY_SHOWN)
        .copied()
        .map(to_color)
        .collect();
    ui.set_history_model(ModelRc::from(Rc::new(VecModel::from(history))));
}

fn sync_palette(ui: &AppWindow, shell: &Shell) {
    let settings = shell.ctx.settings();
    let page = &shell.palette;

    let current = page
        .current()
        .map(|colors| swatches_of(colors, settings))
        .unwrap_or_default();
    ui.set_current_palette(swatch_model(current));

    let rows: Vec<PaletteRow> = page
        .panel()
        .items()
        .iter()
        .filter_map(|item| match i32::try_from(item.id()) {
            Ok(id) => Some(PaletteRow {
                id,
                swatches: swatch_model(item.swatches(settings)),
            }),
            Err(_) => {
                warn!(id = item.id().raw(), "palette id out of range for the view");
                None
            }
        })
        .collect();
    ui.set_palette_history(ModelRc::from(Rc::new(VecModel::from(rows))));

    ui.set_palette_mode_index(page.input_mode().index() as i32);
    ui.set_palette_input(page.input().into());
    ui.set_history_open(page.is_history_open());
}

fn sync_settings(ui: &AppWindow, shell: &Shell) {
    let s = shell.ctx.settings();
    let skin = ui.global::<Skin>();
    skin.set_dark_mode(s.is_dark_theme);

    ui.set_setting_dark_mode(s.is_dark_theme);
    ui.set_setting_hex_upper(s.hex_uppercase());
    ui.set_setting_rgb_separator(s.rgb_separator().into());
    ui.set_setting_favorite_index(s.favorite_color_type().index() as i32);
    ui.set_setting_startup_index(s.startup_page().index() as i32);
    ui.set_setting_restore_colors(s.restores_color_history());
    ui.set_setting_restore_palettes(s.restores_palette_history());
    ui.set_setting_pinned(s.is_pinned());
    ui.set_setting_compact(s.compact_mode());
    ui.set_setting_text_font(s.text_tool_font().into());
    ui.set_setting_text_size(s.text_tool_font_size());

    let (fg, bg) = s.text_tool_colors(s.is_dark_theme);
    let parse = |text: &str, fallback: Rgb| {
        parse_color(ColorType::Hex, text, "").unwrap_or(fallback)
    };
    ui.set_text_font(s.text_tool_font().into());
    ui.set_text_size(s.text_tool_font_size());
    ui.set_text_fg(to_color(parse(&fg, Rgb::new(0, 0, 0))));
    ui.set_text_bg(to_color(parse(&bg, Rgb::new(255, 255, 255))));
}

fn sync_all(ui: &AppWindow, shell: &Shell) {
    sync_settings(ui, shell);
    sync_picker(ui, shell);
    sync_palette(ui, shell);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let ui = AppWindow::new()?;
    let ui_handle = ui.as_weak();

    let restart_requested = Rc::new(Cell::new(false));
    let notifier = Rc::new(DialogNotifier {
        ui: ui_handle.clone(),
    });
    let restarter = Rc::new(RestartAfterDialog {
        requested: restart_requested.clone(),
    });

    let (mut ctx, palette) =
        chroma_picker::app::start(notifier.clone(), restarter, Rc::new(SystemClipboard))?;
    match ctx.complete_first_run() {
        Ok(true) => notifier.info("Welcome to ChromaPicker!"),
        Ok(false) => {}
        Err(e) => warn!("could not record first run: {}", e),
    }

    let current = ctx.history.colors().first().copied().unwrap_or(DEFAULT_COLOR);
    let startup_page = ctx.settings().startup_page();
    let shell = Rc::new(RefCell::new(Shell {
        ctx,
        palette,
        current,
    }));

    sync_all(&ui, &shell.borrow());
    ui.set_current_page(startup_page.index() as i32);
    ui.set_picker_input(
        format_hex(current, shell.borrow().ctx.settings().hex_uppercase())
            .into(),
    );

    // Picker

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_value_accepted(move |type_index, value| {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut shell = state.borrow_mut();
        let kind = ColorType::from_index(type_index as usize);
        let separator = shell.ctx.settings().rgb_separator().to_string();
        match parse_color(kind, &value, &separator) {
            Ok(color) => {
                shell.current = color;
                if let Err(e) = shell.ctx.accept_color(color) {
                    error!("history: save failed: {}", e);
                }
                sync_picker(&ui, &shell);
            }
            Err(e) => warn!("{}", e),
        }
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_shade_clicked(move |index| {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut shell = state.borrow_mut();
        let Some(color) = calculate_shades(shell.current).get(index as usize).copied() else {
            return;
        };
        shell.current = color;
        if let Err(e) = shell.ctx.accept_color(color) {
            error!("history: save failed: {}", e);
        }
        sync_picker(&ui, &shell);
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_history_clicked(move |index| {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut shell = state.borrow_mut();
        if let Some(color) = shell.ctx.history.colors().get(index as usize).copied() {
            shell.current = color;
            sync_picker(&ui, &shell);
        }
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_clear_history(move || {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut shell = state.borrow_mut();
        if let Err(e) = shell.ctx.clear_color_history() {
            error!("history: save failed: {}", e);
        }
        sync_picker(&ui, &shell);
    });

    let state = shell.clone();
    ui.on_copy_to_clipboard(move |text| {
        if let Err(e) = state.borrow().ctx.copy_text(&text) {
            error!("{}", e);
        }
    });

    // Converter

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_convert(move |type_index, value| {
        let Some(ui) = ui_weak.upgrade() else { return };
        let shell = state.borrow();
        let kind = ColorType::from_index(type_index as usize);
        let rows = match parse_color(kind, &value, shell.ctx.settings().rgb_separator()) {
            Ok(color) => named_values(values_of(&shell, color)),
            Err(_) => ModelRc::from(Rc::new(VecModel::from(Vec::<NamedValue>::new()))),
        };
        ui.set_converter_values(rows);
    });

    // Palette

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_generate_palette(move || {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut guard = state.borrow_mut();
        let shell = &mut *guard;
        shell
            .palette
            .set_input_mode(ColorType::from_index(ui.get_palette_mode_index() as usize));
        shell.palette.set_input(ui.get_palette_input().to_string());
        if let Err(e) = shell.palette.generate_from_input(&mut shell.ctx) {
            warn!("palette: {}", e);
        }
        sync_palette(&ui, shell);
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_random_palette(move || {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut guard = state.borrow_mut();
        let shell = &mut *guard;
        if let Err(e) = shell.palette.generate_random(&mut shell.ctx) {
            warn!("palette: {}", e);
        }
        sync_palette(&ui, shell);
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_toggle_history(move || {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut shell = state.borrow_mut();
        shell.palette.toggle_history();
        ui.set_history_open(shell.palette.is_history_open());
    });

    let state = shell.clone();
    ui.on_copy_current_swatch(move |index| {
        let shell = state.borrow();
        let Some(colors) = shell.palette.current() else { return };
        let Some(color) = colors.get(index as usize).copied() else { return };
        let settings = shell.ctx.settings();
        let text = format_color(
            color,
            settings.favorite_color_type(),
            settings.rgb_separator(),
            settings.hex_uppercase(),
        );
        if let Err(e) = shell.ctx.copy_text(&text) {
            error!("{}", e);
        }
    });

    let state = shell.clone();
    ui.on_copy_history_swatch(move |id, index| {
        let shell = state.borrow();
        let Ok(id) = ItemId::try_from(id) else { return };
        let Some(item) = shell.palette.panel().get(id) else {
            return;
        };
        if let Err(e) = item.copy_swatch(index as usize, &shell.ctx) {
            error!("{}", e);
        }
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_delete_palette(move |id| {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut guard = state.borrow_mut();
        let shell = &mut *guard;
        let Ok(id) = ItemId::try_from(id) else { return };
        if let Err(e) = shell.palette.delete(id, &mut shell.ctx) {
            error!("palette: delete failed: {}", e);
            shell.ctx.notifier().error(&e.to_string());
        }
        sync_palette(&ui, shell);
    });

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_regenerate_palette(move |id| {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut guard = state.borrow_mut();
        let shell = &mut *guard;
        let Ok(id) = ItemId::try_from(id) else { return };
        if let Err(e) = shell.palette.regenerate(id, &shell.ctx) {
            warn!("palette: {}", e);
        }
        sync_palette(&ui, shell);
    });

    // Settings

    let ui_weak = ui_handle.clone();
    let state = shell.clone();
    ui.on_settings_changed(move || {
        let Some(ui) = ui_weak.upgrade() else { return };
        let mut shell = state.borrow_mut();
        let result = shell.ctx.update_settings(|s| {
            s.is_dark_theme = ui.get_setting_dark_mode();
            s.hex_use_upper_case = Some(ui.get_setting_hex_upper());
            s.rgb_separator = Some(ui.get_setting_rgb_separator().to_string());
            s.favorite_color_type = Some(ColorType::from_index(
                ui.get_setting_favorite_index() as usize,
            ));
            s.startup_page = Some(Page::from_index(ui.get_setting_startup_index() as usize));
            s.restore_color_history = Some(ui.get_setting_restore_colors());
            s.restore_palette_color_history = Some(ui.get_setting_restore_palettes());
            s.is_pinned = Some(ui.get_setting_pinned());
            s.use_compact_mode = Some(ui.get_setting_compact());
            s.text_tool_font = Some(ui.get_setting_text_font().to_string());
            s.text_tool_font_size = Some(ui.get_setting_text_size());
        });
        if let Err(e) = result {
            error!("settings: save failed: {}", e);
        }
        sync_all(&ui, &shell);
    });

    let state = shell.clone();
    ui.on_export_settings(move |path: SharedString| {
        if path.trim().is_empty() {
            return;
        }
        // Failures are already reported through the dialog.
        let _ = state.borrow().ctx.export_settings(Path::new(path.trim()));
    });

    let state = shell.clone();
    ui.on_import_settings(move |path: SharedString| {
        if path.trim().is_empty() {
            return;
        }
        let _ = state
            .borrow_mut()
            .ctx
            .import_settings(Path::new(path.trim()));
    });

    let restart = restart_requested.clone();
    ui.on_message_dismissed(move || {
        if restart.get() {
            slint::quit_event_loop().ok();
        }
    });

    ui.window().on_close_requested(move || {
        slint::quit_event_loop().ok();
        slint::CloseRequestResponse::HideWindow
    });

    ui.show()?;
    slint::run_event_loop_until_quit()?;

    if restart_requested.get() {
        info!("restarting to apply imported settings");
        ProcessRestarter.request_restart()?;
    }
    Ok(())
}
