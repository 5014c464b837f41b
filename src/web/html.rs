//! HTML for each page. Every interpolated value goes through [`escape`].

use std::fmt::Write;

use crate::models::{ExpertiseLevel, Paper};
use crate::pages::dashboard::NO_MATCHES_MESSAGE;
use crate::pages::{DashboardPage, Notice, ProfileForm, Route, Tone, LANDING};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;margin:0;background:#f7f8fc;color:#1d2433}
a{color:#4453c9}
.container{max-width:1100px;margin:0 auto;padding:1.5rem}
.brand{font-weight:700;font-size:1.4rem;color:#4453c9;text-decoration:none}
header.bar{display:flex;justify-content:space-between;align-items:center;border-bottom:1px solid #e3e6ef;background:#fff;padding:1rem 1.5rem}
.card{background:#fff;border:1px solid #e3e6ef;border-radius:10px;padding:1.2rem}
.grid{display:grid;gap:1.2rem;grid-template-columns:repeat(auto-fill,minmax(300px,1fr))}
.form{max-width:420px;margin:3rem auto}
.form label{display:block;margin:.8rem 0 .3rem;font-weight:600}
.form input,.form select{width:100%;padding:.6rem;box-sizing:border-box}
.hint{font-size:.8rem;color:#6b7280}
button,.button{padding:.55rem 1rem;border-radius:6px;border:1px solid #4453c9;background:#4453c9;color:#fff;cursor:pointer;text-decoration:none;display:inline-block}
button.outline{background:#fff;color:#4453c9}
button.selected{background:#4453c9;color:#fff}
button.selected.negative{background:#c53030;border-color:#c53030}
.badge{background:#eef0fb;border-radius:999px;padding:.15rem .6rem;font-size:.8rem}
.meta{font-size:.8rem;color:#6b7280;display:flex;gap:.6rem}
.abstract{font-size:.9rem;color:#4b5563;display:-webkit-box;-webkit-line-clamp:3;-webkit-box-orient:vertical;overflow:hidden}
.empty{text-align:center;color:#6b7280;padding:3rem 0;grid-column:1/-1}
#toasts{position:fixed;right:1rem;bottom:1rem;display:flex;flex-direction:column;gap:.5rem}
.toast{background:#fff;border:1px solid #e3e6ef;border-radius:8px;padding:.8rem 1rem;min-width:260px;box-shadow:0 4px 14px rgba(0,0,0,.08)}
.toast.destructive{background:#c53030;color:#fff;border-color:#c53030}
.search{width:100%;max-width:640px;padding:.8rem;font-size:1rem;box-sizing:border-box}
"#;

fn layout(title: &str, notices: &[Notice], body: &str) -> String {
    let mut toasts = String::new();
    for notice in notices {
        toasts.push_str(&toast(notice));
    }
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n\
         <div id=\"toasts\">{toasts}</div>\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn toast(notice: &Notice) -> String {
    let class = match notice.tone {
        Tone::Info => "toast",
        Tone::Destructive => "toast destructive",
    };
    format!(
        "<div class=\"{class}\" role=\"status\"><strong>{}</strong><div>{}</div></div>",
        escape(&notice.title),
        escape(&notice.description)
    )
}

pub fn landing(notices: &[Notice]) -> String {
    let page = &LANDING;
    let mut features = String::new();
    for feature in &page.features {
        let _ = write!(
            features,
            "<div class=\"card\"><h3>{}</h3><p>{}</p></div>",
            escape(feature.title),
            escape(feature.description)
        );
    }
    let links: String = page
        .links
        .iter()
        .enumerate()
        .map(|(i, (label, route))| {
            let class = if i == 0 { "button" } else { "button outline" };
            format!("<a class=\"{class}\" href=\"{}\">{}</a> ", route.path(), escape(label))
        })
        .collect();

    let body = format!(
        "<section class=\"container\" style=\"text-align:center;padding:4rem 1.5rem\">\
         <h1 style=\"font-size:3rem\">{title}</h1><p>{tagline}</p><p>{links}</p></section>\
         <section class=\"container\"><h2 style=\"text-align:center\">{features_heading}</h2>\
         <p style=\"text-align:center\">{features_intro}</p><div class=\"grid\">{features}</div></section>\
         <section class=\"container\"><div class=\"card\" style=\"text-align:center\">\
         <h2>{cta_heading}</h2><p>{cta_text}</p><a class=\"button\" href=\"{cta_href}\">{cta_label}</a></div></section>\
         <footer class=\"container\" style=\"text-align:center\"><p class=\"hint\">{footer}</p></footer>",
        title = escape(page.title),
        tagline = escape(page.tagline),
        features_heading = escape(page.features_heading),
        features_intro = escape(page.features_intro),
        cta_heading = escape(page.cta_heading),
        cta_text = escape(page.cta_text),
        cta_href = page.cta_link.1.path(),
        cta_label = escape(page.cta_link.0),
        footer = escape(page.footer),
    );
    layout(page.title, notices, &body)
}

/// Login or register form; `route` picks which
pub fn auth_form(route: Route, email: &str, notices: &[Notice]) -> String {
    let (heading, action, switch) = match route {
        Route::Register => (
            "Create your account",
            "Sign Up",
            "Already have an account? <a href=\"/login\">Sign in</a>",
        ),
        _ => (
            "Welcome back",
            "Sign In",
            "Don't have an account? <a href=\"/register\">Sign up</a>",
        ),
    };
    let body = format!(
        "<div class=\"form card\"><a class=\"brand\" href=\"/\">PaperScout</a><h2>{heading}</h2>\
         <form method=\"post\" action=\"{path}\">\
         <label for=\"email\">Email</label>\
         <input id=\"email\" name=\"email\" type=\"email\" value=\"{email}\" required>\
         <label for=\"password\">Password</label>\
         <input id=\"password\" name=\"password\" type=\"password\" required>\
         <p><button type=\"submit\">{action}</button></p></form><p class=\"hint\">{switch}</p></div>",
        path = route.path(),
        email = escape(email),
    );
    layout(&format!("{} | PaperScout", action), notices, &body)
}

pub fn profile_setup(form: &ProfileForm, notices: &[Notice]) -> String {
    let mut options = String::from("<option value=\"\">Select your level</option>");
    for level in ExpertiseLevel::ALL {
        let selected = if form.expertise_level == level.as_str() { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{0}\"{selected}>{0}</option>", level.as_str());
    }

    let body = format!(
        "<div class=\"form card\"><a class=\"brand\" href=\"/\">PaperScout</a>\
         <h2>Set Up Your Profile</h2><p class=\"hint\">Help us personalize your research experience</p>\
         <form method=\"post\" action=\"{path}\">\
         <label for=\"domain\">Research Domain</label>\
         <input id=\"domain\" name=\"domain\" placeholder=\"e.g., AI, Healthcare, Physics\" value=\"{domain}\">\
         <p class=\"hint\">What field are you primarily interested in?</p>\
         <label for=\"expertise_level\">Expertise Level</label>\
         <select id=\"expertise_level\" name=\"expertise_level\">{options}</select>\
         <p class=\"hint\">How familiar are you with research in this field?</p>\
         <label for=\"goal\">Primary Goal</label>\
         <input id=\"goal\" name=\"goal\" placeholder=\"e.g., Learning, Research, Teaching\" value=\"{goal}\">\
         <p class=\"hint\">What do you hope to achieve with PaperScout?</p>\
         <p><button type=\"submit\">Complete Setup</button></p></form></div>",
        path = Route::ProfileSetup.path(),
        domain = escape(&form.domain),
        goal = escape(&form.goal),
    );
    layout("Profile Setup | PaperScout", notices, &body)
}

pub fn dashboard(page: &DashboardPage, notices: &[Notice]) -> String {
    let profile_panel = match page.profile() {
        Some(profile) => format!(
            "<div><strong>{}</strong><div class=\"hint\">{} &bull; {}</div></div>",
            escape(&profile.email),
            escape(&profile.domain),
            profile.expertise_level
        ),
        None => String::new(),
    };

    let visible = page.visible();
    let mut cards = String::new();
    for paper in page.papers() {
        let hidden = !visible.iter().any(|p| std::ptr::eq(*p, paper));
        cards.push_str(&paper_card(paper, page.judgment(paper.id), hidden));
    }
    let placeholder = page.placeholder();
    let empty = format!(
        "<p class=\"empty\" id=\"no-results\"{}>{}</p>",
        if placeholder.is_some() { "" } else { " hidden" },
        escape(placeholder.unwrap_or(NO_MATCHES_MESSAGE))
    );

    let body = format!(
        "<header class=\"bar\"><a class=\"brand\" href=\"/dashboard\">PaperScout</a>\
         <div style=\"display:flex;gap:1rem;align-items:center\">{profile_panel}\
         <form method=\"post\" action=\"/logout\"><button class=\"outline\" type=\"submit\">Logout</button></form></div></header>\
         <main class=\"container\"><h1>Discover Research Papers</h1>\
         <p class=\"hint\">Explore cutting-edge research tailored to your interests</p>\
         <form method=\"get\" action=\"/dashboard\"><input class=\"search\" id=\"search\" name=\"q\" type=\"search\" \
         placeholder=\"Search by title, author, or domain...\" value=\"{query}\"></form>\
         <div class=\"grid\" style=\"margin-top:1.5rem\">{cards}{empty}</div></main>\
         <script>{DASHBOARD_SCRIPT}</script>",
        query = escape(page.query()),
    );
    layout("Dashboard | PaperScout", notices, &body)
}

fn paper_card(paper: &Paper, judgment: Option<bool>, hidden: bool) -> String {
    let domain = paper
        .domain
        .as_deref()
        .map(|d| format!("<span class=\"badge\">{}</span>", escape(d)))
        .unwrap_or_default();
    let summary = paper
        .r#abstract
        .as_deref()
        .map(|a| format!("<p class=\"abstract\">{}</p>", escape(a)))
        .unwrap_or_default();
    let venue = paper
        .venue
        .as_deref()
        .map(|v| format!("<strong>{}</strong>", escape(v)))
        .unwrap_or_default();
    let published = paper
        .published_label()
        .map(|d| format!("<span>{}</span>", escape(&d)))
        .unwrap_or_default();

    let button = |helpful: bool, label: &str| {
        let mut class = String::from("outline");
        if judgment == Some(helpful) {
            class.push_str(" selected");
        }
        if !helpful {
            class.push_str(" negative");
        }
        format!("<button type=\"button\" class=\"{class}\" data-feedback=\"{helpful}\">{label}</button>")
    };

    // Search keys mirror the server-side filter: title, each author, domain
    let mut keys = vec![paper.title.to_lowercase()];
    keys.extend(paper.authors.iter().map(|a| a.to_lowercase()));
    if let Some(domain) = &paper.domain {
        keys.push(domain.to_lowercase());
    }

    format!(
        "<article class=\"card\" data-paper-id=\"{id}\" data-search=\"{keys}\"{hidden}>\
         <div style=\"display:flex;justify-content:space-between;gap:1rem\"><div><h3>{title}</h3>\
         <div class=\"hint\">{authors}</div></div><div>{domain}</div></div>{summary}\
         <div style=\"display:flex;justify-content:space-between;align-items:center;border-top:1px solid #e3e6ef;padding-top:.6rem\">\
         <div class=\"meta\">{venue}{published}</div><div>{helpful} {unhelpful}</div></div></article>",
        id = paper.id,
        keys = escape(&keys.join("\n")),
        hidden = if hidden { " hidden" } else { "" },
        title = escape(&paper.title),
        authors = escape(&paper.author_line()),
        helpful = button(true, "Helpful"),
        unhelpful = button(false, "Not Helpful"),
    )
}

/// In-page search and feedback buttons for the dashboard
const DASHBOARD_SCRIPT: &str = r#"
(function () {
  function toast(notice) {
    var el = document.createElement('div');
    el.className = notice.tone === 'destructive' ? 'toast destructive' : 'toast';
    var title = document.createElement('strong');
    title.textContent = notice.title;
    var text = document.createElement('div');
    text.textContent = notice.description;
    el.appendChild(title);
    el.appendChild(text);
    document.getElementById('toasts').appendChild(el);
    setTimeout(function () { el.remove(); }, 4000);
  }

  var search = document.getElementById('search');
  search.addEventListener('input', function () {
    var query = search.value;
    var needle = query.toLowerCase();
    var shown = 0;
    document.querySelectorAll('[data-paper-id]').forEach(function (card) {
      var match = query.trim() === '' ||
        card.dataset.search.split('\n').some(function (key) { return key.indexOf(needle) !== -1; });
      card.hidden = !match;
      if (match) shown += 1;
    });
    document.getElementById('no-results').hidden = shown !== 0;
  });

  document.querySelectorAll('[data-feedback]').forEach(function (button) {
    button.addEventListener('click', async function () {
      var card = button.closest('[data-paper-id]');
      card.querySelectorAll('[data-feedback]').forEach(function (b) { b.classList.remove('selected'); });
      button.classList.add('selected');
      var response = await fetch('/api/feedback', {
        method: 'POST',
        credentials: 'same-origin',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ paper_id: card.dataset.paperId, is_helpful: button.dataset.feedback === 'true' })
      });
      if (response.status === 401) { window.location = '/login'; return; }
      var body = await response.json().catch(function () { return {}; });
      toast(body.success ? body.data.notice
        : { title: 'Error', description: 'Failed to submit feedback.', tone: 'destructive' });
    });
  });

  setTimeout(function () {
    document.querySelectorAll('#toasts .toast').forEach(function (el) { el.remove(); });
  }, 5000);
})();
"#;
