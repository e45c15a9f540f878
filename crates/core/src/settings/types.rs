//! Typed defaults for the settings document.
//!
//! The document itself is handled as untyped JSON so operator-added keys
//! survive a load/save cycle; these structs only describe the shape and
//! default values that migration backfills.

use serde::{Deserialize, Serialize};

/// Port the control panel listens on when the document does not set one
pub const DEFAULT_SERVER_PORT: u16 = 16888;

/// Default exclusion keywords: wheelchair/accessibility areas and obstructed seats
pub const DEFAULT_KEYWORD_EXCLUDE: &str =
    "\"輪椅\",\"身障\",\"身心\",\"障礙\",\"Restricted View\",\"燈柱遮蔽\",\"視線不完整\"";

pub const DEFAULT_SOUND_FILENAME: &str = "assets/sounds/ding-dong.wav";

pub const DEFAULT_HOMEPAGE: &str = "about:blank";

/// Order in which the worker picks among matching dates/areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOrder {
    #[serde(rename = "from top to bottom")]
    FromTopToBottom,
    #[serde(rename = "from bottom to top")]
    FromBottomToTop,
    #[serde(rename = "center")]
    Center,
    #[serde(rename = "random")]
    Random,
}

impl Default for SelectOrder {
    fn default() -> Self {
        Self::Random
    }
}

/// Where the worker grabs the CAPTCHA image from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptchaImageSource {
    #[serde(rename = "NonBrowser")]
    NonBrowser,
    #[serde(rename = "canvas")]
    Canvas,
}

/// Root settings document with default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub homepage: String,
    pub browser: String,
    pub language: String,
    pub ticket_number: u32,
    pub refresh_datetime: String,
    pub date_auto_select: AutoSelect,
    pub area_auto_select: AutoSelect,
    pub keyword_exclude: String,
    pub ocr_captcha: OcrCaptcha,
    pub webdriver_type: String,
    pub kktix: KktixSettings,
    pub tixcraft: TixcraftSettings,
    pub advanced: AdvancedSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            homepage: DEFAULT_HOMEPAGE.to_string(),
            browser: "chrome".to_string(),
            language: "English".to_string(),
            ticket_number: 2,
            refresh_datetime: String::new(),
            date_auto_select: AutoSelect::default(),
            area_auto_select: AutoSelect::default(),
            keyword_exclude: DEFAULT_KEYWORD_EXCLUDE.to_string(),
            ocr_captcha: OcrCaptcha::default(),
            webdriver_type: "nodriver".to_string(),
            kktix: KktixSettings::default(),
            tixcraft: TixcraftSettings::default(),
            advanced: AdvancedSettings::default(),
        }
    }
}

/// Keyword driven selection of a date or a seating area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoSelect {
    pub enable: bool,
    pub mode: SelectOrder,
    pub keyword: String,
}

impl Default for AutoSelect {
    fn default() -> Self {
        Self {
            enable: true,
            mode: SelectOrder::default(),
            keyword: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrCaptcha {
    pub enable: bool,
    pub beta: bool,
    pub force_submit: bool,
    pub image_source: CaptchaImageSource,
}

impl Default for OcrCaptcha {
    fn default() -> Self {
        Self {
            enable: true,
            beta: true,
            force_submit: true,
            image_source: CaptchaImageSource::Canvas,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KktixSettings {
    pub auto_press_next_step_button: bool,
    pub auto_fill_ticket_number: bool,
    pub max_dwell_time: u32,
}

impl Default for KktixSettings {
    fn default() -> Self {
        Self {
            auto_press_next_step_button: true,
            auto_fill_ticket_number: true,
            max_dwell_time: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TixcraftSettings {
    pub pass_date_is_sold_out: bool,
    pub auto_reload_coming_soon_page: bool,
}

impl Default for TixcraftSettings {
    fn default() -> Self {
        Self {
            pass_date_is_sold_out: true,
            auto_reload_coming_soon_page: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySound {
    pub ticket: bool,
    pub order: bool,
    pub filename: String,
}

impl Default for PlaySound {
    fn default() -> Self {
        Self {
            ticket: true,
            order: true,
            filename: DEFAULT_SOUND_FILENAME.to_string(),
        }
    }
}

/// Credentials, notifications and network options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    pub play_sound: PlaySound,
    pub tixcraft_sid: String,
    pub ibonqware: String,
    pub facebook_account: String,
    pub kktix_account: String,
    pub kktix_password: String,
    pub fami_account: String,
    pub fami_password: String,
    pub cityline_account: String,
    pub urbtix_account: String,
    pub urbtix_password: String,
    pub hkticketing_account: String,
    pub hkticketing_password: String,
    pub kham_account: String,
    pub kham_password: String,
    pub ticketplus_account: String,
    pub ticketplus_password: String,
    pub headless: bool,
    pub verbose: bool,
    pub auto_guess_options: bool,
    pub user_guess_string: String,
    pub auto_reload_page_interval: f64,
    pub proxy_server_port: String,
    pub window_size: String,
    pub idle_keyword: String,
    pub resume_keyword: String,
    pub server_port: u16,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            play_sound: PlaySound::default(),
            tixcraft_sid: String::new(),
            ibonqware: String::new(),
            facebook_account: String::new(),
            kktix_account: String::new(),
            kktix_password: String::new(),
            fami_account: String::new(),
            fami_password: String::new(),
            cityline_account: String::new(),
            urbtix_account: String::new(),
            urbtix_password: String::new(),
            hkticketing_account: String::new(),
            hkticketing_password: String::new(),
            kham_account: String::new(),
            kham_password: String::new(),
            ticketplus_account: String::new(),
            ticketplus_password: String::new(),
            headless: false,
            verbose: false,
            auto_guess_options: false,
            user_guess_string: String::new(),
            auto_reload_page_interval: 0.0,
            proxy_server_port: String::new(),
            window_size: "480,1024".to_string(),
            idle_keyword: String::new(),
            resume_keyword: String::new(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}
