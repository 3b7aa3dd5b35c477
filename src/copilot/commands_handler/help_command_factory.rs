use super::*;

pub(super) fn help_command(l10n: &L10n, commands_info: Vec<(String, HelpInfo)>) -> PrintTextCommand {
    let entries = commands_info
        .into_iter()
        .map(|(verb, help_info)| {
            vec![
                if let Some(header_suffix) = help_info.header_suffix {
                    l10n.string(
                        "help-command-full-header",
                        fluent_args![
                            "header" => verb,
                            "suffix" => header_suffix
                        ],
                    )
                } else {
                    l10n.string(
                        "help-command-short-header",
                        fluent_args![
                            "header" => verb
                        ],
                    )
                },
                l10n.string(
                    "help-command-body",
                    fluent_args![
                        "body" => help_info.description
                    ],
                ),
            ]
            .join(NEW_LINE)
        })
        .collect::<Vec<String>>();
    PrintTextCommand {
        help_info: None,
        text: [l10n.string("help-command-header", fluent_args![])]
            .into_iter()
            .chain(entries)
            .collect::<Vec<String>>()
            .join(NEW_LINE),
    }
}
