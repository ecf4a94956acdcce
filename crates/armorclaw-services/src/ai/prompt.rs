//! Prompts for the security audit and the assistant chat.

use armorclaw_core::models::ProjectFile;

/// Characters of each file forwarded to the model.
pub const MAX_FILE_CHARS: usize = 8000;

const RULE: &str = "----------------------------------------";

pub const AUDIT_SYSTEM_PROMPT: &str = r#"You are a senior systems security architect specializing in auditing eBPF (Extended Berkeley Packet Filter) projects.
Analyze the whole project to identify security risks, logic flaws and unsafe coding practices.

Pay particular attention to cross-file analysis:
1. Dependencies and call chains between files.
2. Macros and constants shared across files.
3. Whether shared maps are defined and used consistently and safely.
4. Any cross-file injection risk or resource leak.

Audit along these dimensions:
1. Memory safety: buffer overflows, out-of-bounds access, leaks (especially maps and ring buffers).
2. Concurrency and races: multi-core access, atomicity of map updates, user/kernel interaction.
3. Permissions and capabilities: program types, helper call permissions, least privilege.
4. Resource limits: verifier complexity (instruction count, loops), stack usage, map capacity.
5. Input validation: whether every input from user space or packets is strictly validated.
6. Logical correctness: business logic flaws and error handling.

Reply with strict JSON in exactly this shape:
{
  "score": 0-100,
  "status": "passed" | "warning" | "failed",
  "summary": {"total_checks": number, "passed": number, "warnings": number, "critical": number},
  "checks": [
    {"category": string, "status": "passed" | "warning" | "critical", "details": string, "severity": "info" | "warning" | "critical"}
  ],
  "recommendations": [string],
  "metadata": {"analyzed_at": ISO-8601 string, "analyzer_version": "2.0.0-ai-architect", "file_name": string}
}

Return bare JSON only, without markdown fences or commentary."#;

pub const CHAT_SYSTEM_PROMPT: &str = r#"You are the ArmorClaw AI assistant. You help users understand and audit eBPF (Extended Berkeley Packet Filter) programs.

You can:
1. Answer questions about eBPF technology
2. Explain security best practices for eBPF programs
3. Help users understand kernel hooks and sensors
4. Offer code review advice
5. Answer questions about using the ArmorClaw platform

Be friendly and professional. If a question is outside your expertise, say so politely."#;

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// User prompt listing each file framed by dashed rules.
pub fn build_audit_prompt(project_name: &str, files: &[ProjectFile]) -> String {
    let listing = files
        .iter()
        .map(|file| {
            format!(
                "File: {} (Size: {} bytes)\n{}\n{}\n{}\n",
                file.path,
                file.size,
                RULE,
                truncate_chars(&file.content, MAX_FILE_CHARS),
                RULE
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Perform a security audit of the following eBPF project.\n\n\
         Project name: {}\n\n\
         Project files:\n{}\n\
         Provide a detailed, professional security report.",
        project_name, listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_files_with_sizes() {
        let files = vec![
            ProjectFile::new("src/tracer.bpf.c", "int x;", 6),
            ProjectFile::new("README.md", "# tracer", 7),
        ];
        let prompt = build_audit_prompt("tracer.zip", &files);
        assert!(prompt.contains("Project name: tracer.zip"));
        assert!(prompt.contains("File: src/tracer.bpf.c (Size: 6 bytes)\n----"));
        assert!(prompt.contains("File: README.md (Size: 7 bytes)"));
    }

    #[test]
    fn test_file_content_is_truncated() {
        let long = "é".repeat(MAX_FILE_CHARS + 500);
        let prompt = build_audit_prompt("x", &[ProjectFile::new("big.c", long, 0)]);
        assert_eq!(prompt.matches('é').count(), MAX_FILE_CHARS);
    }
}
