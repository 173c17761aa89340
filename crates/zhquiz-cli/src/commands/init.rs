//! The `zhquiz init` command.

use std::path::Path;

use anyhow::Result;

const STARTER_FILES: [(&str, &str); 6] = [
    ("zhquiz.toml", SAMPLE_CONFIG),
    ("chinese.toml", SAMPLE_WORDS),
    ("characters.toml", SAMPLE_CHARACTERS),
    ("grammar.toml", SAMPLE_GRAMMAR),
    ("chinese.reg", SAMPLE_CHINESE_RULES),
    ("english.reg", SAMPLE_ENGLISH_RULES),
];

pub fn execute() -> Result<()> {
    for (name, content) in STARTER_FILES {
        if Path::new(name).exists() {
            println!("{name} already exists, skipping.");
        } else {
            std::fs::write(name, content)?;
            println!("Created {name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Add your own items to chinese.toml, characters.toml and grammar.toml");
    println!("  2. Run: zhquiz validate --dictionary chinese.toml");
    println!("  3. Run: zhquiz run --dictionaries word,character --limit 10");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# zhquiz configuration

log_file = "chinese.log"
chinese_rules = "chinese.reg"
english_rules = "english.reg"
default_direction = "chinese-to-english"
default_limit = "unbounded"
feedback = true

[dictionaries]
word = "chinese.toml"
character = "characters.toml"
grammar = "grammar.toml"
"#;

const SAMPLE_WORDS: &str = r#"[dictionary]
name = "Starter words"
kind = "word"

[[items]]
id = "w001"
chinese = ["你好"]
english = ["hello", "/hi|hey/"]
note = "nǐ hǎo"

[[items]]
id = "w002"
chinese = ["谢谢"]
english = ["thank you", "thanks"]
note = "xièxie"

[[items]]
id = "w003"
chinese = ["再见"]
english = ["goodbye", "/good ?bye|bye/"]
note = "zàijiàn"

[[items]]
id = "w004"
chinese = ["朋友"]
english = ["friend"]
note = "péngyou"

[[items]]
id = "w005"
chinese = ["吃"]
english = ["to eat"]
note = "chī"
"#;

const SAMPLE_CHARACTERS: &str = r#"[dictionary]
name = "Starter characters"
kind = "character"

[[items]]
id = "c001"
chinese = ["人"]
english = ["person", "people"]
note = "rén"

[[items]]
id = "c002"
chinese = ["大"]
english = ["big", "large"]
note = "dà"

[[items]]
id = "c003"
chinese = ["水"]
english = ["water"]
note = "shuǐ"
"#;

const SAMPLE_GRAMMAR: &str = r#"[dictionary]
name = "Starter grammar"
kind = "grammar"

[[items]]
id = "g001"
chinese = ["吗"]
english = ["yes/no question particle"]
note = "你好吗？"

[[items]]
id = "g002"
chinese = ["了"]
english = ["completed action", "change of state"]
note = "我吃了。"

[[items]]
id = "g003"
chinese = ["的"]
english = ["possessive particle"]
note = "我的书"
"#;

const SAMPLE_CHINESE_RULES: &str = r#"# Rewrites applied to Chinese answers before comparison.

# Accept traditional forms of common characters.
[[rewrite]]
pattern = "們"
replace = "们"

[[rewrite]]
pattern = "謝"
replace = "谢"

[[rewrite]]
pattern = "見"
replace = "见"

# Ignore trailing sentence punctuation.
[[rewrite]]
pattern = "[。！？.!?]+$"
replace = ""
"#;

const SAMPLE_ENGLISH_RULES: &str = r#"# Rewrites applied to English answers (already lowercased) before comparison.

# "to eat", "the friend" and "a friend" all count as the bare word.
[[rewrite]]
pattern = "^(to|the|a|an)\\s+"
replace = ""

# Ignore trailing punctuation.
[[rewrite]]
pattern = "[.!?]+$"
replace = ""
"#;
