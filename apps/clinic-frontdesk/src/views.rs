//! Páginas HTML: painel da equipe e visualização da receita
//!
//! Os dados vêm sempre do backend configurado. Qualquer falha na busca vira
//! uma mensagem fixa; não há nova tentativa.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use clinic_core::models::ConsultationRecord;
use tracing::error;

use crate::state::AppState;

pub const DASHBOARD_ERROR: &str = "Error fetching consultations. Please try again later.";
pub const DASHBOARD_EMPTY: &str = "No consultations available.";
pub const PRESCRIPTION_ERROR: &str = "Unable to fetch consultation details. Please check your URL.";
pub const NO_MEDICATIONS: &str = "No medications prescribed.";

/// Escapa texto para inclusão em HTML
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// só links http(s) viram âncoras
fn safe_href(url: &str) -> Option<String> {
    let lower = url.trim().to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then(|| escape(url.trim()))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

fn message_page(title: &str, message: &str) -> String {
    page(title, &format!("<div>{}</div>\n", escape(message)))
}

pub fn render_dashboard(consultations: &[ConsultationRecord]) -> String {
    let mut body = String::from("<h2>Staff Dashboard</h2>\n");
    if consultations.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", DASHBOARD_EMPTY));
        return page("Staff Dashboard", &body);
    }

    let rows: String = consultations.iter().map(dashboard_row).collect();
    body.push_str(&format!(
        "<table>\n<thead><tr><th>Patient ID</th><th>Diagnosis</th><th>Prescriptions</th>\
         <th>Lab Tests</th><th>Secure URL</th><th>Created At</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>\n",
        rows
    ));
    page("Staff Dashboard", &body)
}

fn dashboard_row(c: &ConsultationRecord) -> String {
    let meds: String = c
        .prescriptions
        .iter()
        .map(|p| format!("<li>{}</li>", escape(&p.medication_name)))
        .collect();
    let tests: String = c
        .lab_tests
        .iter()
        .map(|t| format!("<li>{}</li>", escape(&t.test_name)))
        .collect();
    let link = safe_href(&c.secure_url)
        .map(|href| format!("<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">View</a>", href))
        .unwrap_or_default();
    format!(
        "<tr id=\"{}\"><td>{}</td><td>{}</td><td><ul>{}</ul></td><td><ul>{}</ul></td><td>{}</td><td>{}</td></tr>\n",
        escape(&c.record_id),
        escape(&c.patient_id),
        escape(&c.diagnosis),
        meds,
        tests,
        link,
        c.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn render_prescription(c: &ConsultationRecord) -> String {
    let mut body = String::from("<h2>Consultation Details</h2>\n");
    body.push_str(&format!("<section><h3>Diagnosis</h3><p>{}</p></section>\n", escape(&c.diagnosis)));
    body.push_str(&format!("<section><h3>Notes</h3><p>{}</p></section>\n", escape(&c.notes)));

    body.push_str("<section><h3>Prescribed Medications</h3>\n");
    if c.prescriptions.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", NO_MEDICATIONS));
    } else {
        body.push_str("<ul>\n");
        for p in &c.prescriptions {
            body.push_str(&format!(
                "<li><strong>{}</strong>: {} for {}</li>\n",
                escape(&p.medication_name),
                escape(&p.dosage_instructions),
                escape(&p.duration)
            ));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</section>\n");

    if !c.lab_tests.is_empty() {
        body.push_str("<section><h3>Lab Test Orders</h3>\n<ul>\n");
        for t in &c.lab_tests {
            let results = t
                .lab_results_url
                .as_deref()
                .and_then(safe_href)
                .map(|href| {
                    format!(
                        "<div><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">View Lab Results</a></div>",
                        href
                    )
                })
                .unwrap_or_default();
            body.push_str(&format!(
                "<li><strong>{}</strong>: {}{}</li>\n",
                escape(&t.test_name),
                escape(&t.test_instructions),
                results
            ));
        }
        body.push_str("</ul>\n</section>\n");
    }

    if let Some(follow_up) = c.follow_up_date {
        body.push_str(&format!(
            "<section><h3>Follow-Up Appointment</h3><p>{}</p></section>\n",
            follow_up.format("%Y-%m-%d %H:%M")
        ));
    }

    page("Consultation Details", &body)
}

/// `GET /dashboard`
pub async fn dashboard(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match state.backend.list_consultations().await {
        Ok(consultations) => (StatusCode::OK, Html(render_dashboard(&consultations))),
        Err(e) => {
            error!(error = %e, "Falha ao buscar consultas para o painel");
            (StatusCode::BAD_GATEWAY, Html(message_page("Staff Dashboard", DASHBOARD_ERROR)))
        }
    }
}

/// `GET /prescription/:token`
pub async fn prescription(State(state): State<AppState>, Path(token): Path<String>) -> (StatusCode, Html<String>) {
    match state.backend.fetch_prescription(&token).await {
        Ok(consultation) => (StatusCode::OK, Html(render_prescription(&consultation))),
        Err(e) => {
            error!(error = %e, "Falha ao buscar receita");
            let status = if e.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, Html(message_page("Consultation Details", PRESCRIPTION_ERROR)))
        }
    }
}
