//! User-facing reply texts, one per pipeline outcome.
//!
//! Every template exists in English and Thai; the dispatcher picks one with
//! its configured [`Locale`]. Replies use Telegram's legacy Markdown, so
//! user-supplied fragments go through [`escape_markdown`] first.

use leave_models::{HalfDayPeriod, LeaveRequest, Locale};

use crate::commands::command_list;

/// Escapes the characters legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const EXAMPLES_EN: &str = "• \"Sick leave on 20/11/2025\"\n\
    • \"Vacation 15-17 November 2025, family trip\"\n\
    • \"Half day off on 3 December 2025, morning\"";

const EXAMPLES_TH: &str = "• \"ลาป่วยวันที่ 20/11/2025\"\n\
    • \"ขอลาพักร้อน 15-17 พฤศจิกายน 2025 ไปเที่ยวกับครอบครัว\"\n\
    • \"ขอลาครึ่งวันเช้า วันที่ 3 ธันวาคม 2025\"";

const COMMANDS_TH: &str = "คำสั่งที่ใช้ได้:\n\
    /start - เริ่มต้นใช้งานและดูวิธีเชื่อมต่อบัญชี\n\
    /help - แสดงความช่วยเหลือ\n\
    /connect <email> - เชื่อมต่อแชทนี้กับบัญชีของคุณ";

fn period_label(period: HalfDayPeriod, locale: Locale) -> &'static str {
    match (locale, period) {
        (Locale::En, _) => period.label(),
        (Locale::Th, HalfDayPeriod::Morning) => "ช่วงเช้า",
        (Locale::Th, HalfDayPeriod::Afternoon) => "ช่วงบ่าย",
    }
}

pub fn welcome(locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "👋 Welcome to the leave bot!\n\n\
            First link this chat to your account:\n\
            /connect your.email@company.com\n\n\
            Then just tell me when you need leave, for example:\n{}",
            EXAMPLES_EN
        ),
        Locale::Th => format!(
            "👋 ยินดีต้อนรับสู่บอทขอลา!\n\n\
            เริ่มจากเชื่อมต่อแชทนี้กับบัญชีของคุณ:\n\
            /connect your.email@company.com\n\n\
            จากนั้นพิมพ์บอกวันที่ต้องการลาได้เลย เช่น:\n{}",
            EXAMPLES_TH
        ),
    }
}

pub fn help(locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "{}\n\nTo request leave, send a message with exact dates:\n{}",
            escape_markdown(&command_list()),
            EXAMPLES_EN
        ),
        Locale::Th => format!(
            "{}\n\nส่งคำขอลาโดยพิมพ์ข้อความพร้อมวันที่ที่แน่นอน:\n{}",
            COMMANDS_TH, EXAMPLES_TH
        ),
    }
}

/// The message could not be read as a leave request.
pub fn not_understood(locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "❓ Sorry, I didn't understand that. Please try again.\n\nExamples:\n{}",
            EXAMPLES_EN
        ),
        Locale::Th => format!(
            "❓ ไม่เข้าใจข้อความของคุณ ลองพิมพ์ใหม่นะ\n\nตัวอย่าง:\n{}",
            EXAMPLES_TH
        ),
    }
}

/// Dates or half-day period missing.
pub fn need_specific_date(locale: Locale) -> String {
    match locale {
        Locale::En => "📅 Please give the exact date of your leave, e.g. \"20/11/2025\" or \"15-17 November 2025\".\n\n\
            Relative dates like \"today\", \"tomorrow\" or \"next Monday\" are not accepted.\n\
            For a half day, also say *morning* or *afternoon*."
            .to_string(),
        Locale::Th => "📅 กรุณาระบุวันที่ลาให้ชัดเจน เช่น \"20/11/2025\" หรือ \"15-17 พฤศจิกายน 2025\"\n\n\
            ไม่รับวันที่แบบ \"วันนี้\" \"พรุ่งนี้\" หรือ \"วันจันทร์หน้า\"\n\
            ถ้าลาครึ่งวัน กรุณาระบุ *ช่วงเช้า* หรือ *ช่วงบ่าย* ด้วย"
            .to_string(),
    }
}

pub fn not_linked(locale: Locale) -> String {
    match locale {
        Locale::En => "❌ Your Telegram account is not linked yet.\n\n\
            Link it with:\n/connect your.email@company.com"
            .to_string(),
        Locale::Th => "❌ คุณยังไม่ได้เชื่อมต่อบัญชีกับระบบ\n\n\
            เชื่อมต่อได้ด้วยคำสั่ง:\n/connect your.email@company.com"
            .to_string(),
    }
}

pub fn prompt_for_email(locale: Locale) -> String {
    match locale {
        Locale::En => "✉️ Please include your email address:\n/connect your.email@company.com",
        Locale::Th => "✉️ กรุณาใส่อีเมลของคุณ:\n/connect your.email@company.com",
    }
    .to_string()
}

pub fn profile_not_found(locale: Locale, email: &str) -> String {
    let email = escape_markdown(email);
    match locale {
        Locale::En => format!(
            "❌ No account found for {}.\n\nUse the email you sign in to the leave system with.",
            email
        ),
        Locale::Th => format!(
            "❌ ไม่พบบัญชีของ {}\n\nกรุณาใช้อีเมลเดียวกับที่ใช้เข้าสู่ระบบลา",
            email
        ),
    }
}

pub fn already_linked(locale: Locale, email: &str) -> String {
    let email = escape_markdown(email);
    match locale {
        Locale::En => format!("ℹ️ This Telegram account is already linked to {}.", email),
        Locale::Th => format!("ℹ️ บัญชี Telegram นี้เชื่อมต่อกับ {} อยู่แล้ว", email),
    }
}

pub fn link_failed(locale: Locale) -> String {
    match locale {
        Locale::En => "⚠️ Something went wrong while linking your account. Please try again later.",
        Locale::Th => "⚠️ เกิดข้อผิดพลาดระหว่างเชื่อมต่อบัญชี กรุณาลองใหม่อีกครั้งภายหลัง",
    }
    .to_string()
}

/// Link confirmation; the count is left out when it could not be read.
pub fn linked(locale: Locale, name: &str, email: &str, request_count: Option<usize>) -> String {
    let (name, email) = (escape_markdown(name), escape_markdown(email));
    match locale {
        Locale::En => {
            let mut text = format!(
                "✅ Linked! Hello {}.\n\nThis chat is now connected to {}.",
                name, email
            );
            if let Some(count) = request_count {
                text.push_str(&format!("\nYou have {} leave request(s) on file.", count));
            }
            text.push_str("\n\nSend me your leave request whenever you need one.");
            text
        }
        Locale::Th => {
            let mut text = format!(
                "✅ เชื่อมต่อสำเร็จ! สวัสดีคุณ {}\n\nแชทนี้เชื่อมต่อกับ {} แล้ว",
                name, email
            );
            if let Some(count) = request_count {
                text.push_str(&format!("\nคุณมีคำขอลาในระบบ {} รายการ", count));
            }
            text.push_str("\n\nส่งคำขอลาได้ทุกเมื่อที่ต้องการ");
            text
        }
    }
}

/// Sent when a parsed request could not be saved.
pub fn save_failed(locale: Locale) -> String {
    match locale {
        Locale::En => {
            "⚠️ Your leave request could not be saved. Please try again later or use the web app."
        }
        Locale::Th => "⚠️ บันทึกคำขอลาไม่สำเร็จ กรุณาลองใหม่ภายหลังหรือใช้งานผ่านเว็บ",
    }
    .to_string()
}

/// Confirmation for a stored request.
pub fn submitted(locale: Locale, employee: &str, request: &LeaveRequest) -> String {
    let first = request.start_date().map(|d| d.to_string()).unwrap_or_default();
    let last = request.end_date().map(|d| d.to_string()).unwrap_or_default();
    let days = if request.is_half_day {
        "0.5".to_string()
    } else {
        request.days.to_string()
    };
    let employee = escape_markdown(employee);
    let reason = escape_markdown(&request.reason);

    let mut text = match locale {
        Locale::En => format!(
            "✅ Leave request submitted!\n\n\
            👤 {}\n\
            📅 From: {}\n\
            📅 To: {}\n\
            📊 Days: {}\n\
            💬 Reason: {}\n\
            🏷️ Type: {}",
            employee, first, last, days, reason, request.leave_type
        ),
        Locale::Th => format!(
            "✅ ส่งคำขอลาเรียบร้อยแล้ว!\n\n\
            👤 {}\n\
            📅 จาก: {}\n\
            📅 ถึง: {}\n\
            📊 วัน: {} วัน\n\
            💬 เหตุผล: {}\n\
            🏷️ ประเภท: {}",
            employee, first, last, days, reason, request.leave_type
        ),
    };
    if let Some(period) = request.half_day_period {
        let label = match locale {
            Locale::En => "Half day",
            Locale::Th => "ลาครึ่งวัน",
        };
        text.push_str(&format!("\n🕐 {}: {}", label, period_label(period, locale)));
    }
    text.push_str(match locale {
        Locale::En => "\n\nStatus: ⏳ pending",
        Locale::Th => "\n\nสถานะ: ⏳ รอการอนุมัติ",
    });
    text
}
