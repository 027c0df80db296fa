//! YouTube iframe attributes used when a thumbnail is clicked.

use crate::foundation::error::{PosterError, PosterResult};

const ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

/// Attributes of the player iframe that replaces a clicked thumbnail.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct YoutubeEmbed {
    /// Player URL with autoplay on and related videos limited to the channel.
    pub src: String,
    /// Always `100%`.
    pub width: &'static str,
    /// Always `100%`.
    pub height: &'static str,
    /// Always `0`.
    pub frameborder: u8,
    /// Permissions policy for the frame.
    pub allow: &'static str,
    /// Always `true`.
    pub allowfullscreen: bool,
}

/// Build the embed attributes for `video_id` (`[A-Za-z0-9_-]+`).
pub fn youtube_embed(video_id: &str) -> PosterResult<YoutubeEmbed> {
    if video_id.is_empty()
        || !video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PosterError::validation(format!(
            "invalid youtube video id '{video_id}'"
        )));
    }

    Ok(YoutubeEmbed {
        src: format!("https://www.youtube.com/embed/{video_id}?autoplay=1&rel=0"),
        width: "100%",
        height: "100%",
        frameborder: 0,
        allow: ALLOW,
        allowfullscreen: true,
    })
}

impl YoutubeEmbed {
    /// Render as an `<iframe>` element.
    pub fn to_html(&self) -> String {
        let fullscreen = if self.allowfullscreen {
            " allowfullscreen"
        } else {
            ""
        };
        format!(
            r#"<iframe width="{}" height="{}" src="{}" frameborder="{}" allow="{}"{fullscreen}></iframe>"#,
            self.width,
            self.height,
            self.src.replace('&', "&amp;"),
            self.frameborder,
            self.allow,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_autoplay_url() {
        let e = youtube_embed("dQw4w9WgXcQ").unwrap();
        assert_eq!(
            e.src,
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0"
        );
        assert_eq!(e.width, "100%");
        assert!(e.allow.contains("encrypted-media"));
        assert!(e.allowfullscreen);
    }

    #[test]
    fn rejects_ids_that_could_escape_the_url() {
        for bad in ["", "a b", "x\"onload=", "../x", "id?list=1"] {
            assert!(youtube_embed(bad).is_err(), "{bad:?}");
        }
        assert!(youtube_embed("a-b_C9").is_ok());
    }

    #[test]
    fn html_escapes_query_ampersand() {
        let html = youtube_embed("abc").unwrap().to_html();
        assert!(html.starts_with("<iframe "));
        assert!(html.contains("?autoplay=1&amp;rel=0"));
        assert!(html.contains(r#"frameborder="0""#));
        assert!(html.ends_with("allowfullscreen></iframe>"));
    }
}
