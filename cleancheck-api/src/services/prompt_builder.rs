//! Assessment prompt construction
//!
//! Pure function of the requested task and the static rubric catalog.
//! The prompt embeds the criteria, the point-band scoring table, the exact
//! JSON reply schema and the quality thresholds.

use cleancheck_common::models::{GOOD_THRESHOLD, MEDIUM_THRESHOLD};
use cleancheck_common::{RequestedTask, TaskType};
use std::fmt::Write;

const INSPECTOR_ROLE: &str =
    "You are a professional cleaning quality inspector for WISAG facility management services.";

const SCORING_TABLE: &str = "\
| No. | Task                                | Evaluation Criteria                                            | **Green (2 Points)**                           | **Orange (1 Point)**                      | **Red (0 Points)**                                  |
| --- | ----------------------------------- | -------------------------------------------------------------- | ---------------------------------------------- | ----------------------------------------- | --------------------------------------------------- |
| 1   | Clean / clear the table surface     | No visible stains or crumbs, no trash left on the surface      | Table completely cleared and clean             | Some items or stains still visible        | Surface largely unchanged or only partially cleaned |
| 2   | Empty / check the trash bin         | Bin visibly empty, new bag inserted, no waste on the floor     | Bin empty, new bag properly inserted           | Partially emptied, bag not replaced       | Bin still full or dirty                             |
| 3   | Clean / organize the whiteboard     | Text fully removed without residues, magnets/markers organized | Whiteboard clean, no residues, fully organized | Light traces of text, partially organized | Text still visible, board unorganized               |
| 4   | Tidy up the windowsill / shelf area | Waste removed, dirt (e.g., soil) cleared, surface evenly clean | Windowsill clean and free of dirt/waste        | Some objects or light dirt still visible  | Area messy and dirty                                |
| 5   | Close windows                       | All windows closed                                             | All windows closed                             | Only a few windows closed                 | All windows open                                    |";

const ASSESSMENT_FIELDS: &str = r#"  "overallScore": <number 0-100>,
  "quality": "<GOOD|MEDIUM|POOR>",
  "summary": "<brief one-sentence summary>",
  "findings": [
    {
      "aspect": "<what was evaluated>",
      "status": "<PASS|FAIL>",
      "description": "<detailed observation>"
    }
  ],
  "recommendations": ["<list of improvement suggestions if any>"],
  "confidence": <number 0-100>,
  "observations": [
    {
      "item": "<what was observed: e.g., 'coffee cup', 'stain', 'debris', 'paper stack'>",
      "type": "<OBJECT|STAIN|DEBRIS|ISSUE>",
      "x": <number 0-100, horizontal position as percentage>,
      "y": <number 0-100, vertical position as percentage>,
      "severity": "<LOW|MEDIUM|HIGH>"
    }
  ]"#;

const OBSERVATION_RULES: &str = "\
For observations:
- Identify ALL visible objects, stains, debris, or issues in the image
- Provide accurate coordinate positions (x: left to right, y: top to bottom)
- Mark severity based on impact on cleanliness";

const CLOSING: &str =
    "Be objective, specific, and provide actionable feedback with precise locations.";

/// Build the instruction text sent alongside the image
pub fn build_prompt(task: RequestedTask) -> String {
    match task {
        RequestedTask::AutoDetect => auto_detect_prompt(),
        RequestedTask::Known(task_type) => graded_prompt(task_type),
    }
}

fn graded_prompt(task_type: TaskType) -> String {
    let rubric = task_type.rubric();
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "{INSPECTOR_ROLE} Analyze this image of a {} and provide a detailed quality assessment.\n",
        rubric.name
    );
    prompt.push_str("Evaluation Criteria:\n");
    push_numbered(&mut prompt, rubric.criteria);
    prompt.push('\n');
    prompt.push_str(SCORING_TABLE);
    prompt.push_str("\n\n\nProvide your assessment in the following JSON format:\n{\n");
    prompt.push_str(ASSESSMENT_FIELDS);
    prompt.push_str("\n}\n\n");
    push_tail(&mut prompt);
    prompt
}

fn auto_detect_prompt() -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "{INSPECTOR_ROLE} First identify which cleaning task this image shows, then provide a detailed quality assessment.\n"
    );
    prompt.push_str(
        "Step 1: Classify the image as exactly one of the following task types. \
         Choose the closest match.\n\n",
    );
    for task_type in TaskType::ALL {
        let rubric = task_type.rubric();
        let _ = writeln!(prompt, "{} ({}):", task_type.as_str(), rubric.name);
        push_numbered(&mut prompt, rubric.criteria);
        prompt.push('\n');
    }
    prompt.push_str(
        "Step 2: Grade the image against the evaluation criteria of the task type you detected.\n\n",
    );
    prompt.push_str(SCORING_TABLE);
    prompt.push_str("\n\n\nProvide your assessment in the following JSON format:\n{\n");
    let keys: Vec<&str> = TaskType::ALL.iter().map(TaskType::as_str).collect();
    let _ = writeln!(
        prompt,
        "  \"detectedTaskType\": \"<{}>\",",
        keys.join("|")
    );
    prompt.push_str("  \"taskName\": \"<display name of the detected task type>\",\n");
    prompt.push_str(ASSESSMENT_FIELDS);
    prompt.push_str("\n}\n\n");
    push_tail(&mut prompt);
    prompt
}

fn push_numbered(prompt: &mut String, criteria: &[&str]) {
    for (i, criterion) in criteria.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, criterion);
    }
}

fn push_tail(prompt: &mut String) {
    let _ = writeln!(
        prompt,
        "Quality ratings:\n\
         - GOOD ({GOOD_THRESHOLD}-100): Meets all standards, professional quality\n\
         - MEDIUM ({MEDIUM_THRESHOLD}-{}): Acceptable but needs improvement\n\
         - POOR (0-{}): Does not meet standards, requires rework\n",
        GOOD_THRESHOLD - 1,
        MEDIUM_THRESHOLD - 1
    );
    prompt.push_str(OBSERVATION_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING);
}
