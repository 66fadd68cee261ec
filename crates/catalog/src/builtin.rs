//! Built-in template entries for common chat model families.

use promptweave_core::TemplateEntry;

pub(crate) fn default_entries() -> Vec<TemplateEntry> {
    vec![
        // ── ChatML ─────────────────────────────────────────────────
        chatml("chatml"),
        chatml("qwen").version("2.5"),
        // ── Llama 3 ────────────────────────────────────────────────
        llama3("3"),
        llama3("3.1"),
        // ── Mistral ────────────────────────────────────────────────
        TemplateEntry::new("mistral")
            .system("[INST] ", " [/INST]")
            .user("[INST] ", " [/INST]")
            .assistant("", "</s>")
            .memory("[INST] ", " [/INST]")
            .beginning("<s>"),
        // ── Gemma ──────────────────────────────────────────────────
        // No system turn; system text goes into a user turn.
        TemplateEntry::new("gemma")
            .system("<start_of_turn>user", "<end_of_turn>")
            .user("<start_of_turn>user", "<end_of_turn>")
            .assistant("<start_of_turn>model", "<end_of_turn>")
            .memory("<start_of_turn>user", "<end_of_turn>")
            .other("<start_of_turn>", "\n<end_of_turn>")
            .header_postfix("\n")
            .end_prefix("\n")
            .beginning("<bos>"),
        // ── Phi-3 ──────────────────────────────────────────────────
        TemplateEntry::new("phi3")
            .system("<|system|>", "<|end|>")
            .user("<|user|>", "<|end|>")
            .assistant("<|assistant|>", "<|end|>")
            .header_postfix("\n")
            .end_prefix("\n"),
        // ── Alpaca ─────────────────────────────────────────────────
        TemplateEntry::new("alpaca")
            .system("", "")
            .user("### Instruction:", "")
            .assistant("### Response:", "")
            .memory("### Input:", "")
            .header_postfix("\n")
            .end_prefix("\n")
            .disable_postfix_for("sys"),
    ]
}

fn chatml(family: &str) -> TemplateEntry {
    TemplateEntry::new(family)
        .system("<|im_start|>system", "<|im_end|>")
        .user("<|im_start|>user", "<|im_end|>")
        .assistant("<|im_start|>assistant", "<|im_end|>")
        .memory("<|im_start|>memory", "<|im_end|>")
        .other("<|im_start|>", "\n<|im_end|>")
        .header_postfix("\n")
        .end_prefix("\n")
}

fn llama3(version: &str) -> TemplateEntry {
    TemplateEntry::new("llama3")
        .version(version)
        .system("<|start_header_id|>system<|end_header_id|>", "<|eot_id|>")
        .user("<|start_header_id|>user<|end_header_id|>", "<|eot_id|>")
        .assistant("<|start_header_id|>assistant<|end_header_id|>", "<|eot_id|>")
        .memory("<|start_header_id|>memory<|end_header_id|>", "<|eot_id|>")
        .header_postfix("\n\n")
        .beginning("<|begin_of_text|>")
}
