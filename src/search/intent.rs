//! Leading sentence of a reply, picked from keyword intents.
//!
//! Each intent has substring patterns; confidence is the share of its
//! patterns found in the lowercased message. The first intent with the
//! highest non-zero confidence wins. The intro within an intent is chosen by
//! hashing the message, so the same message always gets the same sentence.

use sha2::{Digest, Sha256};

pub const DEFAULT_INTRO: &str = "I'd be happy to help you with that! Here's what I found:";

#[derive(Debug)]
pub struct Intent {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub intros: &'static [&'static str],
}

pub static INTENTS: &[Intent] = &[
    Intent {
        name: "greeting",
        patterns: &["hello", "hi", "hey", "good morning", "good afternoon", "good evening", "what's up", "how are you"],
        intros: &[
            "Hello! 👋 I'm Roku, your personal trading assistant. I'm here to help you find the perfect broker and answer any trading questions you have!",
            "Hi there! 🌟 Welcome to BrokerAnalysis! I'm excited to help you navigate the world of trading. What can I assist you with today?",
            "Hey! 😊 Great to see you here! I'm Roku, and I specialize in helping traders like you find the best brokers and trading solutions.",
        ],
    },
    Intent {
        name: "recommendation",
        patterns: &["best", "top", "recommend", "suggest", "which", "what", "good", "great", "excellent"],
        intros: &[
            "Great question! 🎯 I'd love to help you find the perfect broker. Based on your needs, here are my top recommendations:",
            "Excellent! 🏆 Finding the right broker is crucial for trading success. Let me share some top-rated options:",
            "Perfect timing! 💡 I have some fantastic broker recommendations that might be exactly what you're looking for:",
        ],
    },
    Intent {
        name: "comparison",
        patterns: &["compare", "vs", "versus", "difference", "better", "between", "against"],
        intros: &[
            "Smart approach! 🔍 Comparing brokers is essential for making the right choice. Here's a detailed comparison:",
            "Excellent question! ⚖️ Let me break down the key differences to help you decide:",
            "Great thinking! 📊 Comparing these options will help you make an informed decision:",
        ],
    },
    Intent {
        name: "beginner",
        patterns: &["beginner", "new", "start", "first time", "learning", "how to", "guide", "tutorial"],
        intros: &[
            "Welcome to trading! 🚀 I'm excited to help you get started on the right foot. Here are beginner-friendly resources:",
            "Perfect! 📚 Starting your trading journey is exciting! Let me guide you with some beginner-friendly options:",
            "Wonderful! 🌱 Every expert was once a beginner. Here's everything you need to start trading safely:",
        ],
    },
    Intent {
        name: "specific_broker",
        patterns: &["etoro", "xm", "oanda", "pepperstone", "ic markets", "interactive brokers", "plus500", "avatrade"],
        intros: &[
            "Great choice to research this broker! 🔍 Here's what I know about them:",
            "Excellent question! 📋 Let me share detailed information about this broker:",
            "Smart research! 💼 Here's a comprehensive overview of this broker:",
        ],
    },
    Intent {
        name: "trading_type",
        patterns: &["forex", "crypto", "stocks", "options", "cfd", "etf", "commodities", "indices"],
        intros: &[
            "Fantastic! 📈 This is a popular trading market. Here are the best brokers for this asset class:",
            "Great choice! 💰 This market offers excellent opportunities. Here are top-rated brokers:",
            "Excellent market selection! 🎯 Here are specialized brokers for this trading type:",
        ],
    },
    Intent {
        name: "tools",
        patterns: &["calculator", "calculate", "pip", "profit", "loss", "converter", "quiz", "tool"],
        intros: &[
            "Perfect! 🛠️ Trading tools are essential for success. Here are our most popular calculators and tools:",
            "Great thinking! 📊 These tools will help you make better trading decisions:",
            "Excellent! ⚡ Let me share some powerful tools to enhance your trading:",
        ],
    },
    Intent {
        name: "regulation",
        patterns: &["regulated", "license", "safe", "secure", "trustworthy", "scam", "legitimate", "regulation"],
        intros: &[
            "Excellent question! 🛡️ Safety and regulation are crucial in trading. Here's what you need to know:",
            "Smart thinking! 🔒 Regulatory compliance is essential. Here are properly regulated brokers:",
            "Great concern! ✅ Security should always be your priority. Here are trusted, regulated options:",
        ],
    },
    Intent {
        name: "fees",
        patterns: &["fee", "cost", "cheap", "expensive", "commission", "spread", "price", "affordable"],
        intros: &[
            "Smart question! 💰 Trading costs can significantly impact your profits. Here's a breakdown:",
            "Excellent point! 📊 Understanding fees is crucial for profitability. Here's what you need to know:",
            "Great thinking! 💡 Cost-effective trading is important. Here are low-cost options:",
        ],
    },
    Intent {
        name: "help",
        patterns: &["help", "support", "problem", "issue", "question", "confused", "don't understand"],
        intros: &[
            "I'm here to help! 🤝 What specific question can I answer for you?",
            "Of course! 💪 I'm happy to assist. What would you like to know?",
            "Absolutely! 🌟 I'm here to support your trading journey. How can I help?",
        ],
    },
];

/// Best matching intent for a message, if any pattern matches.
pub fn detect(message: &str) -> Option<&'static Intent> {
    let lowered = message.to_lowercase();
    let mut best: Option<&'static Intent> = None;
    let mut best_conf = 0.0f32;
    for intent in INTENTS {
        let hits = intent
            .patterns
            .iter()
            .filter(|p| lowered.contains(*p))
            .count();
        let conf = hits as f32 / intent.patterns.len() as f32;
        if conf > best_conf {
            best_conf = conf;
            best = Some(intent);
        }
    }
    best
}

/// Deterministic intro sentence for a message.
pub fn intro_for(message: &str) -> &'static str {
    match detect(message) {
        Some(intent) if !intent.intros.is_empty() => {
            let digest = Sha256::digest(message.as_bytes());
            intent.intros[digest[0] as usize % intent.intros.len()]
        }
        _ => DEFAULT_INTRO,
    }
}
