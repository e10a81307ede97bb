/// Email template functions
///
/// This module builds the messages the board sends.
use super::OutgoingEmail;
use crate::accounts::confirm_email_path;
use crate::orm::ads;

/// Message carrying a signup confirmation code.
pub fn confirmation_code_email(to: &str, code: &str, base_url: &str) -> OutgoingEmail {
    let confirm_link = format!("{}{}", base_url, confirm_email_path(to));

    let body_text = format!(
        r#"Hello,

Your confirmation code is: {}

Enter it at {} to activate your account.
The code expires in {} minutes.

If you did not sign up, please ignore this email.
"#,
        code,
        confirm_link,
        crate::constants::CONFIRMATION_CODE_TTL_MINUTES
    );

    OutgoingEmail::plain(to, "Confirm your email address", &body_text)
}

/// Weekly digest of new ads in the subscriber's categories.
pub fn weekly_digest_email(
    to: &str,
    first_name: &str,
    ads: &[ads::Model],
    base_url: &str,
) -> OutgoingEmail {
    let greeting = if first_name.is_empty() {
        "Hello".to_string()
    } else {
        format!("Hello {}", first_name)
    };

    let mut lines = String::new();
    let mut items = String::new();
    for ad in ads {
        let link = format!("{}/board/ad/{}/", base_url, ad.id);
        lines.push_str(&format!(
            "- [{}] {}\n  {}\n",
            ad.category.label(),
            ad.title,
            link
        ));
        items.push_str(&format!(
            r#"<li>[{}] <a href="{}">{}</a></li>"#,
            ad.category.label(),
            link,
            escape_html(&ad.title)
        ));
    }

    let body_text = format!(
        "{},\n\nNew ads in your categories this week:\n\n{}\nManage your subscription at {}/board/subscription/\n",
        greeting, lines, base_url
    );
    let body_html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Weekly digest</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <p>{},</p>
    <p>New ads in your categories this week:</p>
    <ul>{}</ul>
    <p><a href="{}/board/subscription/">Manage your subscription</a></p>
</body>
</html>"#,
        escape_html(&greeting),
        items,
        base_url
    );

    OutgoingEmail {
        to: vec![to.to_owned()],
        bcc: Vec::new(),
        subject: format!("{} new ad(s) on the board this week", ads.len()),
        body_text,
        body_html: Some(body_html),
    }
}

/// Mass email from a manager: one message, visible recipient is the board
/// itself, every user blind-copied.
pub fn news_email(from_address: &str, subject: &str, text: &str, bcc: Vec<String>) -> OutgoingEmail {
    OutgoingEmail {
        to: vec![from_address.to_owned()],
        bcc,
        subject: subject.to_owned(),
        body_text: text.to_owned(),
        body_html: None,
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
