use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Mailboxes, MultiPart, SinglePart};
use mailwright_core::TransportError;

use crate::backend::{InlinePart, OutgoingEmail};

/// The HTML half of a message: a bare part, or a `multipart/related`
/// wrapping the HTML and its inline parts.
enum HtmlBody {
    Single(SinglePart),
    Related(MultiPart),
}

/// Build a `lettre::Message` from an [`OutgoingEmail`].
///
/// Layout:
/// - text only: `text/plain`
/// - html only: `text/html`, or `multipart/related` when it has inline parts
/// - both: `multipart/alternative` of the two
/// - neither: an empty `text/plain` body
pub fn build_message(email: &OutgoingEmail) -> Result<Message, TransportError> {
    let from_mailbox: Mailbox = email
        .from
        .parse()
        .map_err(|e| TransportError::InvalidAddress(format!("invalid from address: {e}")))?;

    let mut builder = Message::builder()
        .from(from_mailbox)
        .subject(&email.subject);

    for mailbox in parse_mailboxes(&email.to, "recipient")? {
        builder = builder.to(mailbox);
    }

    if let Some(ref reply_to) = email.reply_to {
        let reply_mailbox: Mailbox = reply_to.parse().map_err(|e| {
            TransportError::InvalidAddress(format!("invalid reply-to address: {e}"))
        })?;
        builder = builder.reply_to(reply_mailbox);
    }

    if let Some(ref cc) = email.cc {
        for mailbox in parse_mailboxes(cc, "CC")? {
            builder = builder.cc(mailbox);
        }
    }

    if let Some(ref bcc) = email.bcc {
        for mailbox in parse_mailboxes(bcc, "BCC")? {
            builder = builder.bcc(mailbox);
        }
    }

    let html = email
        .html
        .as_ref()
        .map(|html| html_body(html, &email.inline_parts))
        .transpose()?;

    let message = match (&email.text, html) {
        (Some(text), Some(HtmlBody::Single(html))) => builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text.clone()))
                .singlepart(html),
        ),
        (Some(text), Some(HtmlBody::Related(related))) => builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text.clone()))
                .multipart(related),
        ),
        (Some(text), None) => builder.singlepart(SinglePart::plain(text.clone())),
        (None, Some(HtmlBody::Single(html))) => builder.singlepart(html),
        (None, Some(HtmlBody::Related(related))) => builder.multipart(related),
        (None, None) => builder.body(String::new()),
    }
    .map_err(|e| TransportError::Build(e.to_string()))?;

    Ok(message)
}

fn html_body(html: &str, inline_parts: &[InlinePart]) -> Result<HtmlBody, TransportError> {
    let html_part = SinglePart::html(html.to_owned());
    if inline_parts.is_empty() {
        return Ok(HtmlBody::Single(html_part));
    }

    let mut related = MultiPart::related().singlepart(html_part);
    for part in inline_parts {
        let content_type = ContentType::parse(&part.content_type).map_err(|e| {
            TransportError::Build(format!(
                "invalid content type '{}' for inline part: {e}",
                part.content_type
            ))
        })?;
        related = related.singlepart(
            Attachment::new_inline(part.content_id.clone()).body(part.data.clone(), content_type),
        );
    }
    Ok(HtmlBody::Related(related))
}

fn parse_mailboxes(addresses: &str, role: &str) -> Result<Mailboxes, TransportError> {
    addresses
        .parse()
        .map_err(|e| TransportError::InvalidAddress(format!("invalid {role} address: {e}")))
}
