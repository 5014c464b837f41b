use super::Route;

pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

pub struct Landing {
    pub title: &'static str,
    pub tagline: &'static str,
    pub features_heading: &'static str,
    pub features_intro: &'static str,
    pub features: [Feature; 3],
    pub cta_heading: &'static str,
    pub cta_text: &'static str,
    pub footer: &'static str,
    /// (label, target) pairs in display order
    pub links: [(&'static str, Route); 2],
    pub cta_link: (&'static str, Route),
}

/// Static marketing copy; the landing page never touches the backend
pub const LANDING: Landing = Landing {
    title: "PaperScout",
    tagline: "Discover research papers tailored to your expertise and goals. \
              Accelerate your academic journey with intelligent recommendations.",
    features_heading: "Why Choose PaperScout?",
    features_intro: "Powerful features designed to enhance your research experience",
    features: [
        Feature {
            title: "Personalized Discovery",
            description: "Get paper recommendations tailored to your research domain, \
                          expertise level, and learning goals.",
        },
        Feature {
            title: "Smart Search",
            description: "Find exactly what you need with advanced filtering by \
                          publication date, venue, and domain.",
        },
        Feature {
            title: "Feedback Loop",
            description: "Help improve recommendations by providing feedback on papers, \
                          making your experience better over time.",
        },
    ],
    cta_heading: "Ready to Discover?",
    cta_text: "Join researchers worldwide who trust PaperScout to stay ahead in their field",
    footer: "© 2024 PaperScout. Accelerating research discovery.",
    links: [("Get Started", Route::Register), ("Sign In", Route::Login)],
    cta_link: ("Create Your Account", Route::Register),
};
