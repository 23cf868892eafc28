//! HTML shell and page content.
//!
//! Server-rendered, HTML-first pages: the server owns all state and the
//! small client script in `/static/main.js` only wires DOM events to the
//! view/generate/chat APIs and applies SSE updates.

use crate::profile::OwnerProfile;

/// Generate the HTML shell for the application.
#[must_use]
pub fn html_shell(title: &str, content: &str, profile: &OwnerProfile) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Personal portfolio studio">
    <title>{title} - {name}</title>

    <!-- Application bundle (local assets only) -->
    <script type="module" src="/static/main.js"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="studio-body">
    <div id="app-shell">
        <header class="site-header">
            <a href="/" class="brand">{name}</a>
            <nav class="site-nav">
                <a href="/">Studio</a>
                <a href="/profile">Profile</a>
            </nav>
        </header>

        <main id="app">
            {content}
        </main>

        <footer class="site-footer">
            <p>@{handle} &middot; {tagline}</p>
        </footer>
    </div>
</body>
</html>"#,
        name = profile.name,
        handle = profile.handle,
        tagline = profile.tagline,
    )
}

/// Studio page content: stage, navigation handles, prompt bar, chat widget.
#[must_use]
pub fn studio_content(profile: &OwnerProfile, configured: bool) -> String {
    let cta = if configured {
        r#"<button id="surprise-button" class="surprise-button" data-prompt="Generate my professional Web3 Security Portfolio with my socials">Build My Website</button>"#
            .to_string()
    } else {
        r#"<div class="setup-notice">
                    <strong>Action Required:</strong> API key is not configured.
                    Set <code>GEMINI_API_KEY</code> (or add it to the config file) to enable generation.
                </div>"#
            .to_string()
    };

    let disabled = if configured { "" } else { "disabled" };
    let placeholder = if configured {
        "Describe the portfolio you want..."
    } else {
        "Setup required: connect an API key"
    };

    format!(
        r#"
    <div class="stage-container" id="stage" data-configured="{configured}">
        <div class="empty-state" id="empty-state">
            <div class="empty-content">
                <h1>{name}</h1>
                <p>{tagline}</p>
                {cta}
            </div>
        </div>

        <div class="session-group" id="session-stage">
            <div class="artifact-grid" id="artifact-grid"></div>
        </div>

        <button class="nav-handle left" id="nav-prev" aria-label="Previous" hidden>&larr;</button>
        <button class="nav-handle right" id="nav-next" aria-label="Next" hidden>&rarr;</button>

        <div class="action-bar" id="action-bar" hidden>
            <div class="active-prompt-label" id="active-prompt"></div>
            <div class="action-buttons">
                <button id="grid-button">Grid View</button>
                <button id="source-button">Source</button>
            </div>
        </div>

        <div class="floating-input-container">
            <div class="input-wrapper">
                <input type="text" id="prompt-input" placeholder="{placeholder}" {disabled}>
                <button class="send-button" id="send-button" {disabled}>&uarr;</button>
            </div>
        </div>

        <aside class="side-drawer" id="source-drawer" hidden>
            <header>
                <span>Source Code</span>
                <button id="drawer-close">&times;</button>
            </header>
            <pre class="code-block"><code id="source-code"></code></pre>
        </aside>

        <div class="chat-widget" id="chat-widget">
            <button class="chat-toggle" id="chat-toggle" {disabled}>Chat with me</button>
            <div class="chat-panel" id="chat-panel" hidden>
                <div class="chat-messages" id="chat-messages"></div>
                <div class="chat-input-row">
                    <input type="text" id="chat-input" placeholder="Ask me anything...">
                    <button id="chat-send">Send</button>
                </div>
            </div>
        </div>
    </div>
    "#,
        name = profile.name,
        tagline = profile.tagline,
    )
}

/// Profile page content: static identity, socials, and roadmap.
#[must_use]
pub fn profile_content(profile: &OwnerProfile) -> String {
    let mut socials = String::new();
    for link in &profile.socials {
        socials.push_str(&format!(
            r#"<li><a href="{url}" rel="me noopener">{label}</a></li>"#,
            url = link.url,
            label = link.label,
        ));
    }

    let mut phases = String::new();
    for phase in &profile.phases {
        phases.push_str(&format!("<li>{phase}</li>"));
    }

    format!(
        r#"
    <div class="profile-page">
        <section class="profile-hero">
            <h1>{name}</h1>
            <p class="tagline">{tagline}</p>
            <p class="status-note">{status}</p>
        </section>

        <section class="profile-connect">
            <h2>Connect</h2>
            <ul class="social-links">{socials}</ul>
        </section>

        <section class="profile-roadmap">
            <h2>My Roadmap</h2>
            <ol class="roadmap">{phases}</ol>
        </section>
    </div>
    "#,
        name = profile.name,
        tagline = profile.tagline,
        status = profile.status_note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_embeds_title_and_content() {
        let profile = OwnerProfile::default();
        let html = html_shell("Studio", "<p>inner</p>", &profile);
        assert!(html.contains("<title>Studio - Urwan Mir</title>"));
        assert!(html.contains("<p>inner</p>"));
        assert!(html.contains("/static/app.css"));
    }

    #[test]
    fn test_studio_page_shows_setup_notice_when_unconfigured() {
        let profile = OwnerProfile::default();

        let html = studio_content(&profile, false);
        assert!(html.contains("GEMINI_API_KEY"));
        assert!(html.contains("disabled"));

        let html = studio_content(&profile, true);
        assert!(!html.contains("GEMINI_API_KEY"));
        assert!(html.contains("surprise-button"));
    }

    #[test]
    fn test_profile_page_lists_socials_and_phases() {
        let profile = OwnerProfile::default();
        let html = profile_content(&profile);
        assert!(html.contains("https://github.com/urwanmir"));
        assert!(html.contains("Phase 1"));
    }
}
