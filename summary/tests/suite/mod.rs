mod fixtures;
mod folder_scenarios;
