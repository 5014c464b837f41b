mod common;

use anyhow::Result;

#[tokio::test]
async fn profile_setup_requires_a_session() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::browser()?.get(server.url("/profile-setup")).send().await?;
    assert_eq!(res.url().path(), "/login");
    Ok(())
}

#[tokio::test]
async fn completed_profile_shows_on_dashboard() -> Result<()> {
    let server = common::ensure_server().await?;
    let email = common::unique_email("profile");
    let browser = common::registered(server, &email).await?;

    let res = browser
        .post(server.url("/profile-setup"))
        .form(&[
            ("domain", "Physics"),
            ("expertise_level", "Expert"),
            ("goal", "Track quantum hardware results"),
        ])
        .send()
        .await?;

    assert_eq!(res.url().path(), "/dashboard");
    let html = res.text().await?;
    assert!(html.contains("Profile Created!"));
    assert!(html.contains(&email));
    assert!(html.contains("Physics &bull; Expert"));
    Ok(())
}

#[tokio::test]
async fn second_profile_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let browser = common::registered(server, &common::unique_email("twice")).await?;
    let form = [("domain", "AI"), ("expertise_level", "Beginner"), ("goal", "Learn")];

    let first = browser.post(server.url("/profile-setup")).form(&form).send().await?;
    assert_eq!(first.url().path(), "/dashboard");

    let second = browser.post(server.url("/profile-setup")).form(&form).send().await?;
    assert_eq!(second.url().path(), "/profile-setup");
    assert!(second.text().await?.contains("Profile Creation Failed"));
    Ok(())
}

#[tokio::test]
async fn incomplete_profile_keeps_entered_values() -> Result<()> {
    let server = common::ensure_server().await?;
    let browser = common::registered(server, &common::unique_email("partial")).await?;

    let res = browser
        .post(server.url("/profile-setup"))
        .form(&[("domain", "Healthcare"), ("expertise_level", "Intermediate"), ("goal", "  ")])
        .send()
        .await?;

    assert_eq!(res.url().path(), "/profile-setup");
    let html = res.text().await?;
    assert!(html.contains("Please fill in all fields."));
    assert!(html.contains("value=\"Healthcare\""));
    Ok(())
}
