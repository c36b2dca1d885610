use scraper::Selector;
use std::sync::LazyLock;

/// Marker identifying attached media among the images of a post.
pub const MEDIA_SRC_MARKER: &str = "pbs.twimg.com/media";

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

pub static POST: LazyLock<Selector> = LazyLock::new(|| selector(r#"article[data-testid="tweet"]"#));
pub static BODY: LazyLock<Selector> = LazyLock::new(|| selector(r#"div[data-testid="tweetText"]"#));
pub static TIME: LazyLock<Selector> = LazyLock::new(|| selector("time"));
pub static REPLY: LazyLock<Selector> = LazyLock::new(|| selector(r#"[data-testid="reply"] span"#));
pub static RETWEET: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[data-testid="retweet"] span"#));
pub static LIKE: LazyLock<Selector> = LazyLock::new(|| selector(r#"[data-testid="like"] span"#));
pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
