// Translation tables. French is partial; missing keys fall back to English.

pub(crate) static EN: &[(&str, &str)] = &[
    ("common.invalidJson", "Invalid JSON format"),
    ("common.loading", "Loading..."),
    ("common.retry", "Retry"),
    ("common.timeout", "The request timed out"),
    ("common.cancelled", "The request was cancelled"),
    ("login.errorEmptyFields", "Please enter both email and password"),
    ("login.errorInvalidEmail", "Please enter a valid email address"),
    ("login.errorLoginFailed", "Login failed. Please try again."),
    ("taskEditor.errors.nameRequired", "Template name is required"),
    ("taskEditor.errors.failedImport", "Failed to import template: invalid JSON file"),
    ("taskEditor.errors.exportFailed", "Failed to export template"),
    ("taskManagement.newTaskDefaultName", "New Task"),
    ("taskManagement.newTaskDefaultDescription", "New task description"),
    ("taskManagement.unnamedTask", "Unnamed Task"),
    ("agentDeployment.errors.failedToLoad", "Failed to load agents"),
    ("agentDeployment.errors.nameRequired", "Agent name is required"),
    ("agentDeployment.form.jsonError", "Please fix the JSON configuration errors before saving"),
    ("agentDeployment.reason.stopped", "Stopped"),
    ("agentDeployment.reason.completed", "Running normally"),
    ("agentRuntime.errors.hostnameRequired", "Hostname is required"),
    ("agentRuntime.errors.duplicateHostname", "An engine with hostname {hostname} already exists"),
    ("agentRuntime.errors.sourceIdRequired", "Video source ID is required"),
    ("agentRuntime.errors.duplicateSourceId", "A video source with ID {id} already exists"),
    ("queryMemory.sampleQuery", "SELECT * FROM {schema}.{table} LIMIT 10;"),
    ("queryMemory.queryError", "Query execution failed"),
    ("copilot.simulatedResponse", "This is a simulated response from {agent}. The actual agent integration will be implemented in a future update."),
    ("sidebar.menu.agentTasks.title", "Agent Tasks"),
    ("sidebar.menu.agentTasks.items.taskEditor", "Task Editor"),
    ("sidebar.menu.agentTasks.items.taskManagement", "Task Management"),
    ("sidebar.menu.agentDeployments.title", "Agent Deployments"),
    ("sidebar.menu.agentDeployments.items.runAgents", "Run Agents"),
    ("sidebar.menu.agentDeployments.items.agentRuntime", "Agent Runtime"),
    ("sidebar.menu.monitoring.title", "Monitoring"),
    ("sidebar.menu.monitoring.items.alerts", "Alerts"),
    ("sidebar.menu.monitoring.items.performance", "Performance"),
    ("sidebar.menu.monitoring.items.logs", "Logs"),
    ("sidebar.menu.analysis.title", "Analysis"),
    ("sidebar.menu.analysis.items.resultDashboard", "Result Dashboard"),
    ("sidebar.menu.analysis.items.queryMemory", "Query Memory"),
    ("sidebar.menu.copilot", "Copilot"),
    ("sidebar.menu.settings", "Settings"),
    ("menuDescriptions.taskEditor", "Create and edit task templates"),
    ("menuDescriptions.taskManagement", "Manage your task templates"),
    ("menuDescriptions.runAgents", "Deploy agents and control their tasks"),
    ("menuDescriptions.agentRuntime", "Configure engines, storage and video sources"),
    ("menuDescriptions.alerts", "Review alerts raised by agents"),
    ("menuDescriptions.performance", "Engine and agent performance metrics"),
    ("menuDescriptions.logs", "Browse agent logs"),
    ("menuDescriptions.resultDashboard", "Per-agent result dashboards"),
    ("menuDescriptions.queryMemory", "Query agent memory with SQL"),
    ("menuDescriptions.copilot", "Chat with your agents"),
    ("menuDescriptions.settings", "Console settings"),
];

pub(crate) static FR: &[(&str, &str)] = &[
    ("common.invalidJson", "Format JSON invalide"),
    ("common.loading", "Chargement..."),
    ("common.retry", "Réessayer"),
    ("common.timeout", "La requête a expiré"),
    ("common.cancelled", "La requête a été annulée"),
    ("login.errorEmptyFields", "Veuillez saisir l'e-mail et le mot de passe"),
    ("login.errorInvalidEmail", "Veuillez saisir une adresse e-mail valide"),
    ("login.errorLoginFailed", "Échec de la connexion. Veuillez réessayer."),
    ("taskEditor.errors.nameRequired", "Le nom du modèle est requis"),
    ("taskEditor.errors.failedImport", "Échec de l'importation : fichier JSON invalide"),
    ("taskEditor.errors.exportFailed", "Échec de l'exportation du modèle"),
    ("taskManagement.newTaskDefaultName", "Nouvelle tâche"),
    ("taskManagement.newTaskDefaultDescription", "Description de la nouvelle tâche"),
    ("taskManagement.unnamedTask", "Tâche sans nom"),
    ("agentDeployment.errors.failedToLoad", "Échec du chargement des agents"),
    ("agentDeployment.errors.nameRequired", "Le nom de l'agent est requis"),
    ("agentDeployment.form.jsonError", "Veuillez corriger la configuration JSON avant d'enregistrer"),
    ("agentDeployment.reason.stopped", "Arrêté"),
    ("agentDeployment.reason.completed", "Fonctionne normalement"),
    ("queryMemory.sampleQuery", "SELECT * FROM {schema}.{table} LIMIT 10;"),
    ("queryMemory.queryError", "Échec de l'exécution de la requête"),
    ("copilot.simulatedResponse", "Ceci est une réponse simulée de {agent}. L'intégration réelle de l'agent sera disponible dans une prochaine mise à jour."),
    ("sidebar.menu.agentTasks.title", "Tâches d'agent"),
    ("sidebar.menu.agentTasks.items.taskEditor", "Éditeur de tâches"),
    ("sidebar.menu.agentTasks.items.taskManagement", "Gestion des tâches"),
    ("sidebar.menu.agentDeployments.title", "Déploiements"),
    ("sidebar.menu.agentDeployments.items.runAgents", "Exécuter les agents"),
    ("sidebar.menu.agentDeployments.items.agentRuntime", "Environnement d'exécution"),
    ("sidebar.menu.monitoring.title", "Surveillance"),
    ("sidebar.menu.monitoring.items.alerts", "Alertes"),
    ("sidebar.menu.monitoring.items.performance", "Performance"),
    ("sidebar.menu.monitoring.items.logs", "Journaux"),
    ("sidebar.menu.analysis.title", "Analyse"),
    ("sidebar.menu.analysis.items.resultDashboard", "Tableau de résultats"),
    ("sidebar.menu.analysis.items.queryMemory", "Interroger la mémoire"),
    ("sidebar.menu.copilot", "Copilote"),
    ("sidebar.menu.settings", "Paramètres"),
    ("menuDescriptions.taskEditor", "Créer et modifier des modèles de tâches"),
    ("menuDescriptions.taskManagement", "Gérer vos modèles de tâches"),
    ("menuDescriptions.runAgents", "Déployer les agents et piloter leurs tâches"),
];
