//! Localized fallback messages
//!
//! Server validation messages are shown verbatim; these strings replace
//! transport-level failures that carry no useful message.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

/// Operations that can fail without a server-provided message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Load,
    Save,
    Delete,
    Approve,
    Reject,
    Status,
    Report,
    Download,
    Login,
}

impl Failure {
    /// Fallback for the transition with the given key
    pub fn for_transition(key: &str) -> Self {
        match key {
            "approve" => Failure::Approve,
            "reject" => Failure::Reject,
            _ => Failure::Status,
        }
    }

    pub fn message(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                Failure::Load => "An error occurred while loading data",
                Failure::Save => "An error occurred while saving",
                Failure::Delete => "An error occurred while deleting",
                Failure::Approve => "An error occurred while approving",
                Failure::Reject => "An error occurred while rejecting",
                Failure::Status => "An error occurred while updating the status",
                Failure::Report => "An error occurred while loading the report",
                Failure::Download => "An error occurred while downloading the report",
                Failure::Login => "Sign-in failed. Check the server address and try again",
            },
            Locale::Ar => match self {
                Failure::Load => "حدث خطأ أثناء تحميل البيانات",
                Failure::Save => "حدث خطأ أثناء حفظ البيانات",
                Failure::Delete => "حدث خطأ أثناء الحذف",
                Failure::Approve => "حدث خطأ أثناء الموافقة",
                Failure::Reject => "حدث خطأ أثناء الرفض",
                Failure::Status => "حدث خطأ أثناء تحديث الحالة",
                Failure::Report => "حدث خطأ أثناء تحميل التقرير",
                Failure::Download => "حدث خطأ أثناء تنزيل التقرير",
                Failure::Login => "فشل تسجيل الدخول",
            },
        }
    }
}

/// Prompt shown before deleting a record
pub fn delete_prompt(locale: Locale, label: &str) -> String {
    match locale {
        Locale::En => format!("Delete '{}'? This cannot be undone.", label),
        Locale::Ar => format!("هل أنت متأكد من رغبتك في حذف '{}'؟", label),
    }
}
